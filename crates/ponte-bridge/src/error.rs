//! Bridge error taxonomy
//!
//! Every bridge operation surfaces failures to the caller as one of these
//! kinds; nothing is retried and nothing is swallowed (the one documented
//! exception: an absent member resolves to `Value::Null`). Dispatch
//! diagnostics carry fully qualified signatures — they are the only
//! feedback a script author gets when overload resolution fails.

use ponte_host::HostError;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure raised by a guest callable or by the script runtime itself.
///
/// Carries the taxonomy kind of the originating bridge failure when one
/// crossed back into the guest, so a script-side `catch` can discriminate.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ScriptError {
    /// Taxonomy kind of the originating failure, if any
    pub kind: Option<&'static str>,
    /// Human-readable message
    pub message: String,
}

impl ScriptError {
    /// Create a plain script error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }
}

impl From<BridgeError> for ScriptError {
    fn from(err: BridgeError) -> Self {
        Self {
            kind: Some(err.kind()),
            message: err.to_string(),
        }
    }
}

/// Bridge failure taxonomy
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// A value has no representation on the other side of the boundary
    #[error("cannot coerce {tag} value: {detail}")]
    Coercion {
        /// Guest (or host) type tag of the offending value
        tag: &'static str,
        /// What was being attempted
        detail: String,
    },

    /// No candidate executable matches the given arguments
    #[error("no applicable candidate for {requested}; candidates: {}", .candidates.join("; "))]
    NoMatch {
        /// Textual signature of the requested call
        requested: String,
        /// Textual signatures of every candidate, in declaration order
        candidates: Vec<String>,
    },

    /// The chosen executable raised a host-level failure
    #[error("invocation failed")]
    Invocation {
        /// The original host failure, preserved
        #[source]
        source: HostError,
    },

    /// A guest callable raised during dispatch or adaptation
    #[error("script callable failed")]
    Script {
        /// The original guest failure
        #[source]
        source: ScriptError,
    },

    /// A synthesized-type method has neither a script implementation nor an
    /// inherited fallback
    #[error("method '{name}' has no script implementation and no inherited fallback")]
    UnimplementedMember {
        /// The unimplemented method's name
        name: String,
    },

    /// Invalid subtype/proxy synthesis request
    #[error("illegal synthesis: {reason}")]
    IllegalSynthesis {
        /// Why the request was rejected
        reason: String,
    },
}

impl BridgeError {
    /// Stable kind name, used when a failure crosses into the guest
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::Coercion { .. } => "coercion",
            BridgeError::NoMatch { .. } => "no-match",
            BridgeError::Invocation { .. } => "invocation",
            BridgeError::Script { .. } => "script",
            BridgeError::UnimplementedMember { .. } => "unimplemented-member",
            BridgeError::IllegalSynthesis { .. } => "illegal-synthesis",
        }
    }

    /// Wrap a host failure, mapping an unimplemented-method failure from a
    /// synthesized type to its own taxonomy kind.
    pub(crate) fn from_host(source: HostError) -> Self {
        match source {
            HostError::Unimplemented { method } => BridgeError::UnimplementedMember { name: method },
            source => BridgeError::Invocation { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_lists_all_candidates() {
        let err = BridgeError::NoMatch {
            requested: "demo.Text.sub(string)".to_string(),
            candidates: vec![
                "demo.Text.sub(int)".to_string(),
                "demo.Text.sub(int, int)".to_string(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("demo.Text.sub(string)"));
        assert!(msg.contains("demo.Text.sub(int)"));
        assert!(msg.contains("demo.Text.sub(int, int)"));
    }

    #[test]
    fn test_invocation_preserves_cause() {
        let err = BridgeError::from_host(HostError::Raised("index out of range".to_string()));
        let source = std::error::Error::source(&err).expect("cause preserved");
        assert!(source.to_string().contains("index out of range"));
    }

    #[test]
    fn test_unimplemented_mapping() {
        let err = BridgeError::from_host(HostError::Unimplemented {
            method: "render".to_string(),
        });
        assert!(matches!(err, BridgeError::UnimplementedMember { .. }));
        assert_eq!(err.kind(), "unimplemented-member");
    }

    #[test]
    fn test_script_error_carries_kind() {
        let err = BridgeError::IllegalSynthesis {
            reason: "final".to_string(),
        };
        let script: ScriptError = err.into();
        assert_eq!(script.kind, Some("illegal-synthesis"));
    }
}
