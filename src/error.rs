use thiserror::Error;

/// Typed failures of the reconciliation engine.
///
/// Operations return `anyhow::Result` and carry one of these inside the
/// `anyhow::Error`; the HTTP layer downcasts to pick the status code.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Bad, missing or contradictory input. Nothing was mutated.
    #[error("{0}")]
    Validation(String),

    /// A resource exists with a different configuration and needs an operator.
    #[error("{0}")]
    Drift(String),

    /// The requested change touches attributes that cannot be changed in place.
    #[error("{0}")]
    Unsupported(String),

    /// The interface is still referenced by a VRRP instance.
    #[error("{0}")]
    DependencyConflict(String),

    #[error("{0} not found")]
    NotFound(String),

    /// An external program exited non-zero (or could not be spawned).
    #[error("{command}: {output}")]
    Command { command: String, output: String },

    /// The slave could not be reached at all.
    #[error("slave unreachable: {0}")]
    Transport(String),

    /// The slave answered with a failure status.
    #[error("error on slave => {message}")]
    Peer { status: u16, message: String },
}

impl ReconcileError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn drift(msg: impl Into<String>) -> Self {
        Self::Drift(msg.into())
    }

    pub fn command(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            output: output.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = ReconcileError::drift("vrrp already exist on slave with different config").into();
        match err.downcast_ref::<ReconcileError>() {
            Some(ReconcileError::Drift(msg)) => assert!(msg.contains("slave")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_peer_message_format() {
        let err = ReconcileError::Peer {
            status: 500,
            message: "ifup failed".to_string(),
        };
        assert_eq!(err.to_string(), "error on slave => ifup failed");
    }
}
