// Music Player native core
// Shake-to-act detection, sleep timer bookkeeping and settings glue exposed to Kotlin via JNI

pub mod action;
pub mod android_jni;
pub mod error;
pub mod sensor_receiver;
pub mod service;
pub mod settings;
pub mod shake;
pub mod sleep_timer;

pub use action::{ActionExecutor, ActionKind, ChannelExecutor, PlaybackCommand};
pub use error::{JResult, MusicPlayerError};
pub use sensor_receiver::AccelSample;
pub use service::{SensorRegistry, ShakeService};
pub use settings::{ListPreference, MemoryPreferences, Preferences};
pub use shake::{DetectorState, ShakeConfig, ShakeDetector};
pub use sleep_timer::{AlarmScheduler, SleepTimer};
