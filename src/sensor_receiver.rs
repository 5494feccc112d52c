use serde::{Deserialize, Serialize};

/// Accelerometer sample from Android SensorEvent
///
/// `timestamp_ms` is on the elapsed-realtime clock (monotonic milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp_ms: i64,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: i64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms,
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// NaN or infinite axes would poison the jerk filter permanently.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accel_magnitude() {
        let accel = AccelSample::new(3.0, 4.0, 0.0, 0);
        assert_eq!(accel.magnitude(), 5.0);
    }

    #[test]
    fn test_finite_check() {
        assert!(AccelSample::new(0.0, 9.81, 0.0, 10).is_finite());
        assert!(!AccelSample::new(f64::NAN, 0.0, 0.0, 10).is_finite());
        assert!(!AccelSample::new(0.0, 0.0, f64::INFINITY, 10).is_finite());
    }
}
