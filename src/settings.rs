use crate::action::ActionKind;
use crate::error::JResult;
use crate::shake::{ShakeConfig, DEFAULT_MIN_PERIOD_MS};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Preference keys shared with the Kotlin settings screen
pub mod keys {
    pub const ENABLE_SHAKE: &str = "enable_shake";
    pub const SHAKE_ACTION: &str = "shake_action";
    pub const SHAKE_THRESHOLD: &str = "shake_threshold";
}

/// Defaults used when a key is absent
pub mod defaults {
    use crate::action::ActionKind;

    pub const ENABLE_SHAKE: bool = false;
    pub const SHAKE_ACTION: ActionKind = ActionKind::NextSong;
    /// Tenths of the jerk threshold
    pub const SHAKE_THRESHOLD: i32 = 80;
}

/// Key/value settings store provided by the host (SharedPreferences on Android)
pub trait Preferences {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn get_int(&self, key: &str, default: i32) -> i32;
    fn get_long(&self, key: &str, default: i64) -> i64;
    fn get_string(&self, key: &str, default: &str) -> String;

    fn put_bool(&mut self, key: &str, value: bool);
    fn put_int(&mut self, key: &str, value: i32);
    fn put_long(&mut self, key: &str, value: i64);
    fn put_string(&mut self, key: &str, value: &str);
}

/// A single stored preference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// HashMap-backed preference store, serialized as a flat JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryPreferences {
    values: HashMap<String, PrefValue>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the snapshot the Kotlin side sends, e.g.
    /// `{"enable_shake": true, "shake_action": "PlayPause", "shake_threshold": 80}`
    pub fn from_json(json: &str) -> JResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> JResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Copy the value of `key` from a host snapshot, removing it if the
    /// snapshot no longer has it. Keys written on the native side stay put.
    pub fn apply_change(&mut self, snapshot: &MemoryPreferences, key: &str) {
        match snapshot.values.get(key) {
            Some(value) => {
                self.values.insert(key.to_string(), value.clone());
            }
            None => {
                self.values.remove(key);
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn mismatch<T>(&self, key: &str, expected: &str, default: T) -> T {
        warn!("Preference {} is not a {}, using default", key, expected);
        default
    }
}

impl Preferences for MemoryPreferences {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            None => default,
            Some(PrefValue::Bool(b)) => *b,
            Some(_) => self.mismatch(key, "bool", default),
        }
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.values.get(key) {
            None => default,
            Some(PrefValue::Int(v)) => match i32::try_from(*v) {
                Ok(v) => v,
                Err(_) => self.mismatch(key, "32-bit int", default),
            },
            Some(_) => self.mismatch(key, "int", default),
        }
    }

    fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            None => default,
            Some(PrefValue::Int(v)) => *v,
            Some(_) => self.mismatch(key, "long", default),
        }
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            None => default.to_string(),
            Some(PrefValue::Str(s)) => s.clone(),
            Some(_) => self.mismatch(key, "string", default.to_string()),
        }
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), PrefValue::Bool(value));
    }

    fn put_int(&mut self, key: &str, value: i32) {
        self.values
            .insert(key.to_string(), PrefValue::Int(i64::from(value)));
    }

    fn put_long(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), PrefValue::Int(value));
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), PrefValue::Str(value.to_string()));
    }
}

/// Read an action preference, falling back to `default` for unknown values
pub fn get_action<P: Preferences + ?Sized>(prefs: &P, key: &str, default: ActionKind) -> ActionKind {
    let raw = prefs.get_string(key, default.as_str());
    raw.parse().unwrap_or_else(|_| {
        warn!("Unknown action {:?} under {}, using {}", raw, key, default);
        default
    })
}

/// Effective shake action: `Nothing` unless shaking is enabled
pub fn load_shake_action<P: Preferences + ?Sized>(prefs: &P) -> ActionKind {
    if prefs.get_bool(keys::ENABLE_SHAKE, defaults::ENABLE_SHAKE) {
        get_action(prefs, keys::SHAKE_ACTION, defaults::SHAKE_ACTION)
    } else {
        ActionKind::Nothing
    }
}

/// Threshold is stored in tenths
pub fn load_shake_threshold<P: Preferences + ?Sized>(prefs: &P) -> f64 {
    f64::from(prefs.get_int(keys::SHAKE_THRESHOLD, defaults::SHAKE_THRESHOLD)) / 10.0
}

impl ShakeConfig {
    pub fn from_preferences<P: Preferences + ?Sized>(prefs: &P) -> Self {
        ShakeConfig::new(
            load_shake_threshold(prefs),
            DEFAULT_MIN_PERIOD_MS,
            load_shake_action(prefs),
        )
    }
}

/// List preference that shows the selected entry as its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPreference {
    pub key: String,
    /// Human-readable labels
    pub entries: Vec<String>,
    /// Stored values, parallel to `entries`
    pub entry_values: Vec<String>,
    pub value: Option<String>,
}

impl ListPreference {
    pub fn new(key: &str, entries: Vec<String>, entry_values: Vec<String>) -> Self {
        ListPreference {
            key: key.to_string(),
            entries,
            entry_values,
            value: None,
        }
    }

    /// Load the current value from the store
    pub fn bind<P: Preferences + ?Sized>(&mut self, prefs: &P) {
        let stored = prefs.get_string(&self.key, "");
        self.value = if stored.is_empty() { None } else { Some(stored) };
    }

    pub fn find_index_of_value(&self, value: &str) -> Option<usize> {
        self.entry_values.iter().position(|v| v == value)
    }

    /// The label of the selected entry
    pub fn summary(&self) -> Option<&str> {
        let index = self.find_index_of_value(self.value.as_deref()?)?;
        self.entries.get(index).map(String::as_str)
    }

    /// Persist the clicked entry on a positive result and return the summary
    /// to display. The summary is refreshed either way.
    pub fn on_dialog_closed<P: Preferences + ?Sized>(
        &mut self,
        prefs: &mut P,
        positive_result: bool,
        clicked_index: Option<usize>,
    ) -> Option<&str> {
        if positive_result {
            if let Some(value) = clicked_index.and_then(|i| self.entry_values.get(i)).cloned() {
                prefs.put_string(&self.key, &value);
                self.value = Some(value);
            }
        }
        self.summary()
    }
}
