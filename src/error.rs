use jni::JNIEnv;
use thiserror::Error;

/// Music player native error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MusicPlayerError {
    #[error("Native service not initialized")]
    NotInitialized,

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Sensor error: {0}")]
    Sensor(String),

    #[error("Alarm scheduling failed: {0}")]
    Alarm(String),

    #[error("Action dispatch failed: {0}")]
    Dispatch(String),

    #[error("JNI error: {0}")]
    JniError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for native operations
pub type JResult<T> = Result<T, MusicPlayerError>;

impl From<serde_json::Error> for MusicPlayerError {
    fn from(err: serde_json::Error) -> Self {
        MusicPlayerError::Settings(err.to_string())
    }
}

impl From<jni::errors::Error> for MusicPlayerError {
    fn from(err: jni::errors::Error) -> Self {
        MusicPlayerError::JniError(err.to_string())
    }
}

/// Java exception class thrown for each error kind
pub fn exception_class(error: &MusicPlayerError) -> &'static str {
    match error {
        MusicPlayerError::NotInitialized => "java/lang/IllegalStateException",
        MusicPlayerError::InvalidParameters(_) | MusicPlayerError::Settings(_) => {
            "java/lang/IllegalArgumentException"
        }
        MusicPlayerError::Sensor(_) | MusicPlayerError::Alarm(_) => "java/io/IOException",
        MusicPlayerError::Dispatch(_)
        | MusicPlayerError::JniError(_)
        | MusicPlayerError::Internal(_) => "java/lang/RuntimeException",
    }
}

/// Throw Java exception from Rust error
pub fn throw_java_exception(env: &mut JNIEnv, error: &MusicPlayerError) -> JResult<()> {
    let message = error.to_string();
    env.throw_new(exception_class(error), message)
        .map_err(|_| MusicPlayerError::JniError("Failed to throw exception".to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_mapping() {
        assert_eq!(
            exception_class(&MusicPlayerError::NotInitialized),
            "java/lang/IllegalStateException"
        );
        assert_eq!(
            exception_class(&MusicPlayerError::InvalidParameters("x".into())),
            "java/lang/IllegalArgumentException"
        );
        assert_eq!(
            exception_class(&MusicPlayerError::Alarm("denied".into())),
            "java/io/IOException"
        );
        assert_eq!(
            exception_class(&MusicPlayerError::Internal("poisoned".into())),
            "java/lang/RuntimeException"
        );
    }

    #[test]
    fn test_json_error_becomes_settings_error() {
        let err: MusicPlayerError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, MusicPlayerError::Settings(_)));
    }
}
