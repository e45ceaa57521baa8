//! Error types for the clock screen.

use thiserror::Error;

/// Errors that can occur while configuring the screen or talking to the platform.
///
/// Platform errors ([`Error::Unsupported`], [`Error::Rejected`]) never reach the
/// user: the screen swallows them and keeps ticking. Configuration errors are
/// returned from the loaders in [`crate::config`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The platform does not offer the capability at all
    #[error("capability not supported: {0}")]
    Unsupported(&'static str),

    /// The platform declined the request (no user activation, policy, ...)
    #[error("request rejected by platform: {0}")]
    Rejected(String),

    /// Invalid configuration value or document
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(format!("invalid JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(format!("invalid YAML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Unsupported("wake lock");
        assert!(err.to_string().contains("wake lock"));

        let err = Error::Rejected("NotAllowedError".to_string());
        assert!(err.to_string().contains("rejected"));
        assert!(err.to_string().contains("NotAllowedError"));
    }

    #[test]
    fn test_from_json_error() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Config(msg) if msg.starts_with("invalid JSON")));
    }
}
