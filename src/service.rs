use crate::action::{ActionExecutor, ActionKind, PlaybackCommand};
use crate::error::{JResult, MusicPlayerError};
use crate::sensor_receiver::AccelSample;
use crate::settings::{keys, load_shake_action, load_shake_threshold, Preferences};
use crate::shake::{ShakeConfig, ShakeDetector};
use log::{info, warn};
use std::sync::Arc;

/// Host accelerometer subscription (SensorManager on Android)
pub trait SensorRegistry {
    fn register_accelerometer(&mut self) -> JResult<()>;
    fn unregister_accelerometer(&mut self) -> JResult<()>;
}

/// Shake-to-act service: keeps the detector in sync with the settings store,
/// subscribes to the accelerometer only while an action is configured, and
/// forwards detected shakes to the executor.
pub struct ShakeService<P, R, E> {
    prefs: P,
    sensors: R,
    executor: E,
    detector: ShakeDetector,
    sensor_registered: bool,
}

impl<P, R, E> ShakeService<P, R, E>
where
    P: Preferences,
    R: SensorRegistry,
    E: ActionExecutor,
{
    pub fn new(prefs: P, sensors: R, executor: E) -> JResult<Self> {
        let config = ShakeConfig::from_preferences(&prefs);
        info!(
            "Shake service created: action {}, threshold {:.1}",
            config.action, config.threshold
        );

        let mut service = ShakeService {
            prefs,
            sensors,
            executor,
            detector: ShakeDetector::new(Arc::new(config)),
            sensor_registered: false,
        };
        service.setup_sensor()?;
        Ok(service)
    }

    /// Subscribe while an action is configured, unsubscribe otherwise
    fn setup_sensor(&mut self) -> JResult<()> {
        if self.detector.config().action == ActionKind::Nothing {
            if self.sensor_registered {
                self.sensors.unregister_accelerometer()?;
                self.sensor_registered = false;
                info!("Accelerometer unregistered");
            }
        } else if !self.sensor_registered {
            self.sensors.register_accelerometer()?;
            self.sensor_registered = true;
            info!("Accelerometer registered");
        }
        Ok(())
    }

    /// Reload whatever `key` affects. Returns true when the shake config changed.
    pub fn on_preference_changed(&mut self, key: &str) -> JResult<bool> {
        let current = self.detector.config();

        let next = match key {
            keys::ENABLE_SHAKE | keys::SHAKE_ACTION => ShakeConfig {
                action: load_shake_action(&self.prefs),
                ..(*current).clone()
            },
            keys::SHAKE_THRESHOLD => ShakeConfig {
                threshold: load_shake_threshold(&self.prefs),
                ..(*current).clone()
            },
            _ => return Ok(false),
        };

        if next == *current {
            return Ok(false);
        }

        info!(
            "Shake config reloaded ({}): action {}, threshold {:.1}",
            key, next.action, next.threshold
        );
        self.detector.reconfigure(Arc::new(next));

        if key != keys::SHAKE_THRESHOLD {
            self.setup_sensor()?;
        }
        Ok(true)
    }

    /// Feed one accelerometer reading. Returns the action emitted, if any.
    pub fn on_sensor_changed(&mut self, sample: &AccelSample) -> JResult<Option<ActionKind>> {
        if !sample.is_finite() {
            warn!("Rejected non-finite accelerometer sample: {:?}", sample);
            return Err(MusicPlayerError::InvalidParameters(
                "Accelerometer sample must be finite".to_string(),
            ));
        }

        let emitted = self.detector.on_sample(sample, sample.timestamp_ms);
        if let Some(action) = emitted {
            if action != ActionKind::Nothing {
                self.executor.execute(action)?;
            }
        }
        Ok(emitted)
    }

    /// Map an action to the music service command
    pub fn perform_action(&self, action: ActionKind, is_playing: bool) -> Option<PlaybackCommand> {
        action.resolve(is_playing)
    }

    pub fn config(&self) -> Arc<ShakeConfig> {
        self.detector.config()
    }

    pub fn detector(&self) -> &ShakeDetector {
        &self.detector
    }

    pub fn is_sensor_registered(&self) -> bool {
        self.sensor_registered
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut P {
        &mut self.prefs
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn sensors(&self) -> &R {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut R {
        &mut self.sensors
    }

    /// Drop the accelerometer subscription before teardown
    pub fn shutdown(&mut self) -> JResult<()> {
        if self.sensor_registered {
            self.sensors.unregister_accelerometer()?;
            self.sensor_registered = false;
        }
        Ok(())
    }
}
