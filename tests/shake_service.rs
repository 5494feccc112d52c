use musicplayer_jni::settings::keys;
use musicplayer_jni::sleep_timer::KEY_TIMER_EXPIRATION;
use musicplayer_jni::{
    AccelSample, ActionKind, AlarmScheduler, ChannelExecutor, JResult, MemoryPreferences,
    Preferences, SensorRegistry, ShakeService, SleepTimer,
};

#[derive(Default)]
struct FakeSensors {
    active: bool,
}

impl SensorRegistry for FakeSensors {
    fn register_accelerometer(&mut self) -> JResult<()> {
        self.active = true;
        Ok(())
    }

    fn unregister_accelerometer(&mut self) -> JResult<()> {
        self.active = false;
        Ok(())
    }
}

#[derive(Default)]
struct FakeAlarms {
    at: Option<i64>,
}

impl AlarmScheduler for FakeAlarms {
    fn schedule_pause(&mut self, at_ms: i64) -> JResult<()> {
        self.at = Some(at_ms);
        Ok(())
    }

    fn cancel_pause(&mut self) -> JResult<()> {
        self.at = None;
        Ok(())
    }
}

type TestService = ShakeService<MemoryPreferences, FakeSensors, ChannelExecutor>;

fn service_with(json: &str) -> TestService {
    let prefs = MemoryPreferences::from_json(json).unwrap();
    ShakeService::new(prefs, FakeSensors::default(), ChannelExecutor::new()).unwrap()
}

fn shake(service: &mut TestService, x: f64, t: i64) -> Option<ActionKind> {
    service
        .on_sensor_changed(&AccelSample::new(x, 0.0, 0.0, t))
        .unwrap()
}

#[test]
fn test_action_change_mid_stream_only_affects_later_shakes() {
    let mut service =
        service_with(r#"{"enable_shake": true, "shake_action": "NextSong", "shake_threshold": 10}"#);
    let rx = service.executor().receiver();

    assert_eq!(shake(&mut service, 5.0, 1_000), Some(ActionKind::NextSong));

    service
        .prefs_mut()
        .put_string(keys::SHAKE_ACTION, "PreviousSong");
    assert!(service.on_preference_changed(keys::SHAKE_ACTION).unwrap());

    assert_eq!(shake(&mut service, 25.0, 2_000), Some(ActionKind::PreviousSong));

    let delivered: Vec<ActionKind> = rx.try_iter().collect();
    assert_eq!(delivered, vec![ActionKind::NextSong, ActionKind::PreviousSong]);
}

#[test]
fn test_rapid_shakes_within_period_dispatch_once() {
    let mut service =
        service_with(r#"{"enable_shake": true, "shake_action": "PlayPause", "shake_threshold": 10}"#);

    let emitted: Vec<_> = [(5.0, 1_000), (15.0, 1_100), (40.0, 1_400)]
        .iter()
        .filter_map(|&(x, t)| shake(&mut service, x, t))
        .collect();

    assert_eq!(emitted, vec![ActionKind::PlayPause]);
    assert_eq!(service.executor().pending(), 1);
}

#[test]
fn test_disabled_shake_emits_nothing_to_playback() {
    let mut service = service_with(r#"{"enable_shake": false, "shake_threshold": 0}"#);
    assert!(!service.sensors().active);

    // Detector still runs if a stray sample arrives, but Nothing is not dispatched
    assert_eq!(shake(&mut service, 5.0, 1_000), Some(ActionKind::Nothing));
    assert_eq!(service.executor().pending(), 0);
}

#[test]
fn test_sleep_timer_shares_settings_store() {
    let mut service = service_with(r#"{"enable_shake": true}"#);
    let mut alarms = FakeAlarms::default();

    let expiration = SleepTimer::set_timer(service.prefs_mut(), &mut alarms, 5_000, 900).unwrap();
    assert_eq!(expiration, 905_000);
    assert_eq!(alarms.at, Some(905_000));
    assert!(SleepTimer::is_timer_set(service.prefs(), 6_000));

    // Unrelated to shake config
    assert!(!service.on_preference_changed(KEY_TIMER_EXPIRATION).unwrap());

    SleepTimer::cancel_timer(service.prefs_mut(), &mut alarms).unwrap();
    assert!(!SleepTimer::is_timer_set(service.prefs(), 6_000));
}
