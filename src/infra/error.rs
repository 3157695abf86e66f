use thiserror::Error;

/// Failures raised while bringing the server up or keeping it running.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("http listener failed: {0}")]
    Listener(#[from] std::io::Error),
    #[error("database unavailable: {message}")]
    Database { message: String },
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
    #[error("invalid configuration: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn subscriber(message: impl Into<String>) -> Self {
        Self::Subscriber(message.into())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn bind_failure_becomes_listener_error() {
        let err = InfraError::from(io::Error::new(io::ErrorKind::AddrInUse, "port taken"));

        assert!(matches!(err, InfraError::Listener(_)));
        assert_eq!(err.to_string(), "http listener failed: port taken");
    }

    #[test]
    fn messages_name_the_failing_subsystem() {
        assert_eq!(
            InfraError::database("pool timed out").to_string(),
            "database unavailable: pool timed out"
        );
        assert_eq!(
            InfraError::configuration("database url is not configured").to_string(),
            "invalid configuration: database url is not configured"
        );
    }
}
