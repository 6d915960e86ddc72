use miette::Diagnostic;
use thiserror::Error;

/// Core error type for Lodestar operations
#[derive(Error, Debug, Diagnostic)]
pub enum LodestarError {
    /// Authorization check failed
    #[error("Permission denied: cannot {verb} {target}")]
    #[diagnostic(
        code(lodestar::permission_denied),
        help("Check the RBAC bindings for this subject in the target namespace")
    )]
    PermissionDenied {
        #[allow(unused)]
        verb: String,
        #[allow(unused)]
        target: String,
    },

    /// Network or remote-API failure during a list call or live subscription
    #[error("Transport error: {message}")]
    #[diagnostic(
        code(lodestar::transport_error),
        help("Verify the upstream API server is reachable and the session can be restarted")
    )]
    Transport {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failure to encode or decode an item as JSON
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(lodestar::serialization_error),
        help("Ensure the item payload is valid JSON")
    )]
    Serialization {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote server sent a payload the engine cannot make sense of
    #[error("Protocol error: {message}")]
    #[diagnostic(
        code(lodestar::protocol_error),
        help("The upstream server may be incompatible with this client version")
    )]
    Protocol {
        #[allow(unused)]
        message: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(lodestar::internal_error),
        help("This is likely a bug. Please report it with the full error details")
    )]
    Internal {
        #[allow(unused)]
        message: String,
    },
}

/// Result type alias for Lodestar operations
pub type Result<T> = std::result::Result<T, LodestarError>;

impl LodestarError {
    /// Create a PermissionDenied error
    pub fn permission_denied(verb: impl Into<String>, target: impl Into<String>) -> Self {
        Self::PermissionDenied {
            verb: verb.into(),
            target: target.into(),
        }
    }

    /// Create a Transport error
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source,
        }
    }

    /// Create a Serialization error
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a Protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for LodestarError {
    fn from(err: serde_json::Error) -> Self {
        LodestarError::serialization(err.to_string(), Some(Box::new(err)))
    }
}
