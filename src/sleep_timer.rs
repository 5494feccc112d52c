use crate::error::{JResult, MusicPlayerError};
use crate::settings::Preferences;
use log::info;

pub const KEY_TIMER_SET: &str = "com.frontier.musicplayer.KEY_TIMER_SET";
pub const KEY_TIMER_EXPIRATION: &str = "com.frontier.musicplayer.KEY_TIMER_EXPIRATION";

/// Host alarm service. Times are on the elapsed-realtime clock in milliseconds.
pub trait AlarmScheduler {
    /// Wake the device at `at_ms` and send the pause command
    fn schedule_pause(&mut self, at_ms: i64) -> JResult<()>;
    fn cancel_pause(&mut self) -> JResult<()>;
}

/// Pause-after-N-seconds timer, persisted in the preference store
pub struct SleepTimer;

impl SleepTimer {
    /// Timer flag is set and the expiration is still in the future
    pub fn is_timer_set<P: Preferences + ?Sized>(prefs: &P, now_ms: i64) -> bool {
        prefs.get_bool(KEY_TIMER_SET, false)
            && now_ms.saturating_sub(prefs.get_long(KEY_TIMER_EXPIRATION, 0)) < 0
    }

    /// Milliseconds until the pause fires, if a timer is running
    pub fn remaining_ms<P: Preferences + ?Sized>(prefs: &P, now_ms: i64) -> Option<i64> {
        if Self::is_timer_set(prefs, now_ms) {
            Some(prefs.get_long(KEY_TIMER_EXPIRATION, 0).saturating_sub(now_ms))
        } else {
            None
        }
    }

    /// Schedule a pause `seconds` from `now_ms`. Returns the expiration time.
    ///
    /// A new timer replaces any running one.
    pub fn set_timer<P, A>(prefs: &mut P, alarms: &mut A, now_ms: i64, seconds: i32) -> JResult<i64>
    where
        P: Preferences + ?Sized,
        A: AlarmScheduler + ?Sized,
    {
        if seconds < 0 {
            return Err(MusicPlayerError::InvalidParameters(format!(
                "Sleep timer seconds must be non-negative, got {}",
                seconds
            )));
        }

        let expiration = now_ms
            .checked_add(i64::from(seconds) * 1000)
            .ok_or_else(|| MusicPlayerError::InvalidParameters("Sleep timer overflow".to_string()))?;

        alarms.schedule_pause(expiration)?;

        prefs.put_bool(KEY_TIMER_SET, true);
        prefs.put_long(KEY_TIMER_EXPIRATION, expiration);

        info!("Sleep timer set for {} s (expires at {} ms)", seconds, expiration);
        Ok(expiration)
    }

    /// Cancel the pending pause. The stored expiration is left as is.
    pub fn cancel_timer<P, A>(prefs: &mut P, alarms: &mut A) -> JResult<()>
    where
        P: Preferences + ?Sized,
        A: AlarmScheduler + ?Sized,
    {
        alarms.cancel_pause()?;
        prefs.put_bool(KEY_TIMER_SET, false);

        info!("Sleep timer cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryPreferences;

    #[derive(Default)]
    struct RecordingAlarms {
        scheduled: Option<i64>,
        cancels: u32,
        fail: bool,
    }

    impl AlarmScheduler for RecordingAlarms {
        fn schedule_pause(&mut self, at_ms: i64) -> JResult<()> {
            if self.fail {
                return Err(MusicPlayerError::Alarm("exact alarms not permitted".to_string()));
            }
            self.scheduled = Some(at_ms);
            Ok(())
        }

        fn cancel_pause(&mut self) -> JResult<()> {
            self.scheduled = None;
            self.cancels += 1;
            Ok(())
        }
    }

    #[test]
    fn test_set_timer_persists_expiration() {
        let mut prefs = MemoryPreferences::new();
        let mut alarms = RecordingAlarms::default();

        let expiration = SleepTimer::set_timer(&mut prefs, &mut alarms, 10_000, 30).unwrap();
        assert_eq!(expiration, 40_000);
        assert_eq!(alarms.scheduled, Some(40_000));
        assert!(prefs.get_bool(KEY_TIMER_SET, false));
        assert_eq!(prefs.get_long(KEY_TIMER_EXPIRATION, 0), 40_000);
    }

    #[test]
    fn test_timer_expires() {
        let mut prefs = MemoryPreferences::new();
        let mut alarms = RecordingAlarms::default();
        SleepTimer::set_timer(&mut prefs, &mut alarms, 0, 60).unwrap();

        assert!(SleepTimer::is_timer_set(&prefs, 59_999));
        assert_eq!(SleepTimer::remaining_ms(&prefs, 59_000), Some(1_000));
        assert!(!SleepTimer::is_timer_set(&prefs, 60_000));
        assert_eq!(SleepTimer::remaining_ms(&prefs, 61_000), None);
    }

    #[test]
    fn test_cancel_clears_flag_only() {
        let mut prefs = MemoryPreferences::new();
        let mut alarms = RecordingAlarms::default();
        SleepTimer::set_timer(&mut prefs, &mut alarms, 0, 60).unwrap();

        SleepTimer::cancel_timer(&mut prefs, &mut alarms).unwrap();
        assert_eq!(alarms.cancels, 1);
        assert_eq!(alarms.scheduled, None);
        assert!(!SleepTimer::is_timer_set(&prefs, 1_000));
        assert_eq!(prefs.get_long(KEY_TIMER_EXPIRATION, 0), 60_000);
    }

    #[test]
    fn test_never_set_is_not_running() {
        let prefs = MemoryPreferences::new();
        assert!(!SleepTimer::is_timer_set(&prefs, -5));
    }

    #[test]
    fn test_extreme_clock_values_saturate() {
        let mut prefs = MemoryPreferences::new();
        prefs.put_bool(KEY_TIMER_SET, true);
        prefs.put_long(KEY_TIMER_EXPIRATION, i64::MAX);
        assert!(SleepTimer::is_timer_set(&prefs, i64::MIN));
        assert_eq!(SleepTimer::remaining_ms(&prefs, i64::MIN), Some(i64::MAX));

        prefs.put_long(KEY_TIMER_EXPIRATION, i64::MIN);
        assert!(!SleepTimer::is_timer_set(&prefs, i64::MAX));
        assert_eq!(SleepTimer::remaining_ms(&prefs, i64::MAX), None);
    }

    #[test]
    fn test_negative_seconds_rejected() {
        let mut prefs = MemoryPreferences::new();
        let mut alarms = RecordingAlarms::default();
        let err = SleepTimer::set_timer(&mut prefs, &mut alarms, 0, -1).unwrap_err();
        assert!(matches!(err, MusicPlayerError::InvalidParameters(_)));
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_alarm_failure_leaves_prefs_untouched() {
        let mut prefs = MemoryPreferences::new();
        let mut alarms = RecordingAlarms {
            fail: true,
            ..Default::default()
        };
        let err = SleepTimer::set_timer(&mut prefs, &mut alarms, 0, 10).unwrap_err();
        assert!(matches!(err, MusicPlayerError::Alarm(_)));
        assert!(!prefs.contains(KEY_TIMER_SET));
    }
}
