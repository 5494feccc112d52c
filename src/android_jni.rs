use crate::action::{ActionKind, ChannelExecutor};
use crate::error::{throw_java_exception, JResult, MusicPlayerError};
use crate::sensor_receiver::AccelSample;
use crate::service::{SensorRegistry, ShakeService};
use crate::settings::MemoryPreferences;
use crate::sleep_timer::{AlarmScheduler, SleepTimer};
use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jfloat, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::info;
use std::sync::{Mutex, Once};

/// Sensor subscription is performed by the Kotlin service; we only track
/// whether it should be active.
#[derive(Debug, Default)]
pub struct HostSensors {
    wanted: bool,
}

impl SensorRegistry for HostSensors {
    fn register_accelerometer(&mut self) -> JResult<()> {
        self.wanted = true;
        Ok(())
    }

    fn unregister_accelerometer(&mut self) -> JResult<()> {
        self.wanted = false;
        Ok(())
    }
}

/// The AlarmManager call happens on the Kotlin side with the returned deadline.
#[derive(Debug, Default)]
pub struct HostAlarms {
    pending: Option<i64>,
}

impl AlarmScheduler for HostAlarms {
    fn schedule_pause(&mut self, at_ms: i64) -> JResult<()> {
        self.pending = Some(at_ms);
        Ok(())
    }

    fn cancel_pause(&mut self) -> JResult<()> {
        self.pending = None;
        Ok(())
    }
}

type NativeService = ShakeService<MemoryPreferences, HostSensors, ChannelExecutor>;

struct NativeState {
    service: NativeService,
    alarms: HostAlarms,
}

// Global service state - stored as static to persist across JNI calls.
// Sensor and preference callbacks both go through this lock, so a config
// reload never interleaves with a sample.
lazy_static::lazy_static! {
    static ref GLOBAL_STATE: Mutex<Option<NativeState>> = Mutex::new(None);
}

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        {
            let _ = android_log::init("MusicPlayer");
        }
    });
}

fn with_state<T>(f: impl FnOnce(&mut NativeState) -> JResult<T>) -> JResult<T> {
    let mut guard = GLOBAL_STATE.lock().map_err(|_| {
        MusicPlayerError::Internal("Failed to acquire global state lock".to_string())
    })?;
    let state = guard.as_mut().ok_or(MusicPlayerError::NotInitialized)?;
    f(state)
}

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

fn read_string(env: &mut JNIEnv, value: &JString) -> JResult<String> {
    Ok(env.get_string(value)?.into())
}

fn new_jstring(env: &mut JNIEnv, value: &str) -> JResult<jstring> {
    Ok(env.new_string(value)?.into_raw())
}

/// JNI: Build the native service from a settings snapshot (JSON object)
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_init(
    mut env: JNIEnv,
    _class: JClass,
    settings_json: JString,
) -> jint {
    let result = read_string(&mut env, &settings_json).and_then(|json| init_impl(&json));
    match result {
        Ok(_) => 0,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn init_impl(settings_json: &str) -> JResult<()> {
    init_logging();

    let prefs = MemoryPreferences::from_json(settings_json)?;
    let service = ShakeService::new(prefs, HostSensors::default(), ChannelExecutor::new())?;

    let mut guard = GLOBAL_STATE.lock().map_err(|_| {
        MusicPlayerError::Internal("Failed to acquire global state lock".to_string())
    })?;
    *guard = Some(NativeState {
        service,
        alarms: HostAlarms::default(),
    });

    info!("Native music player core initialized");
    Ok(())
}

/// JNI: Settings changed on the Kotlin side
/// Returns: 1 if the shake config changed, 0 if not, -1 on error
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_onPreferenceChanged(
    mut env: JNIEnv,
    _class: JClass,
    key: JString,
    settings_json: JString,
) -> jint {
    let result = read_string(&mut env, &key).and_then(|key| {
        let json = read_string(&mut env, &settings_json)?;
        on_preference_changed_impl(&key, &json)
    });
    match result {
        Ok(changed) => jint::from(changed),
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn on_preference_changed_impl(key: &str, settings_json: &str) -> JResult<bool> {
    let snapshot = MemoryPreferences::from_json(settings_json)?;
    with_state(|state| {
        state.service.prefs_mut().apply_change(&snapshot, key);
        state.service.on_preference_changed(key)
    })
}

/// JNI: Accelerometer SensorEvent
/// Parameters: x, y, z (m/s²), elapsed realtime (ms)
/// Returns: action code emitted, -1 if none (throws Java exception on error)
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_onSensorChanged(
    mut env: JNIEnv,
    _class: JClass,
    x: jfloat,
    y: jfloat,
    z: jfloat,
    elapsed_realtime_ms: jlong,
) -> jint {
    match on_sensor_changed_impl(f64::from(x), f64::from(y), f64::from(z), elapsed_realtime_ms) {
        Ok(Some(action)) => action.code(),
        Ok(None) => -1,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn on_sensor_changed_impl(x: f64, y: f64, z: f64, now_ms: i64) -> JResult<Option<ActionKind>> {
    let sample = AccelSample::new(x, y, z, now_ms);
    with_state(|state| state.service.on_sensor_changed(&sample))
}

/// JNI: Next dispatched action for the playback thread
/// Returns: action code, -1 if the queue is empty
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_pollAction(
    mut env: JNIEnv,
    _class: JClass,
) -> jint {
    match poll_action_impl() {
        Ok(Some(action)) => action.code(),
        Ok(None) => -1,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn poll_action_impl() -> JResult<Option<ActionKind>> {
    with_state(|state| state.service.executor().try_next())
}

/// JNI: Intent action for an action code
/// Returns: intent action string, or null for Nothing
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_resolveCommand(
    mut env: JNIEnv,
    _class: JClass,
    action_code: jint,
    is_playing: jboolean,
) -> jstring {
    let result = resolve_command_impl(action_code, is_playing != JNI_FALSE).and_then(|intent| {
        match intent {
            Some(intent) => new_jstring(&mut env, intent),
            None => Ok(std::ptr::null_mut()),
        }
    });
    match result {
        Ok(jstr) => jstr,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            std::ptr::null_mut()
        }
    }
}

fn resolve_command_impl(action_code: i32, is_playing: bool) -> JResult<Option<&'static str>> {
    let action = ActionKind::from_code(action_code).ok_or_else(|| {
        MusicPlayerError::InvalidParameters(format!("Unknown action code: {}", action_code))
    })?;
    Ok(action.resolve(is_playing).map(|cmd| cmd.intent_action()))
}

/// JNI: Whether the Kotlin service should keep the accelerometer registered
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_isSensorWanted(
    mut env: JNIEnv,
    _class: JClass,
) -> jboolean {
    match with_state(|state| Ok(state.service.sensors().wanted)) {
        Ok(wanted) => to_jboolean(wanted),
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            JNI_FALSE
        }
    }
}

/// JNI: Start the sleep timer
/// Returns: elapsed-realtime deadline to hand to AlarmManager, -1 on error
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_setSleepTimer(
    mut env: JNIEnv,
    _class: JClass,
    seconds: jint,
    now_ms: jlong,
) -> jlong {
    match set_sleep_timer_impl(seconds, now_ms) {
        Ok(expiration) => expiration,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn set_sleep_timer_impl(seconds: i32, now_ms: i64) -> JResult<i64> {
    with_state(|state| {
        SleepTimer::set_timer(state.service.prefs_mut(), &mut state.alarms, now_ms, seconds)
    })
}

/// JNI: Cancel the sleep timer
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_cancelSleepTimer(
    mut env: JNIEnv,
    _class: JClass,
) -> jint {
    match with_state(|state| SleepTimer::cancel_timer(state.service.prefs_mut(), &mut state.alarms)) {
        Ok(_) => 0,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

/// JNI: Deadline the Kotlin side should have armed in AlarmManager,
/// -1 if no pause is pending (e.g. to re-arm after the service restarts)
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_pendingAlarmMs(
    mut env: JNIEnv,
    _class: JClass,
) -> jlong {
    match pending_alarm_impl() {
        Ok(pending) => pending.unwrap_or(-1),
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn pending_alarm_impl() -> JResult<Option<i64>> {
    with_state(|state| Ok(state.alarms.pending))
}

/// JNI: Whether a sleep timer is running at `now_ms`
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_isTimerSet(
    mut env: JNIEnv,
    _class: JClass,
    now_ms: jlong,
) -> jboolean {
    match with_state(|state| Ok(SleepTimer::is_timer_set(state.service.prefs(), now_ms))) {
        Ok(set) => to_jboolean(set),
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            JNI_FALSE
        }
    }
}

/// JNI: Milliseconds left on the sleep timer, -1 if none is running
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_timerRemainingMs(
    mut env: JNIEnv,
    _class: JClass,
    now_ms: jlong,
) -> jlong {
    match with_state(|state| Ok(SleepTimer::remaining_ms(state.service.prefs(), now_ms))) {
        Ok(remaining) => remaining.unwrap_or(-1),
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

/// JNI: Export the native preference snapshot as JSON
/// Returns: JSON string or null on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_com_frontier_musicplayer_NativeBridge_settingsJson(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    let result = with_state(|state| state.service.prefs().to_json())
        .and_then(|json| new_jstring(&mut env, &json));
    match result {
        Ok(jstr) => jstr,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            std::ptr::null_mut()
        }
    }
}
