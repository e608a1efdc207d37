//! Error types for host-side operations

/// Result type for host registry operations
pub type HostResult<T> = Result<T, HostError>;

/// Host-level failure raised by the type registry or by a host member body
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    /// No type with that name is registered
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A type with that name already exists in the registry
    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    /// The named member does not exist on the type
    #[error("Member '{member}' not found on {type_name}")]
    UnknownMember {
        /// Owning type name
        type_name: String,
        /// Requested member name
        member: String,
    },

    /// An abstract method was invoked with no concrete implementation
    #[error("Method '{method}' has no implementation")]
    Unimplemented {
        /// Method name
        method: String,
    },

    /// Attempt to subtype a final type
    #[error("Type {type_name} is final and cannot be subtyped")]
    FinalType {
        /// The final type's name
        type_name: String,
    },

    /// No public constructor is available for instantiation
    #[error("Type {type_name} has no accessible constructor")]
    NoAccessibleConstructor {
        /// The type's name
        type_name: String,
    },

    /// Attempt to write a final field
    #[error("Field '{field}' on {type_name} is final")]
    ImmutableField {
        /// Owning type name
        type_name: String,
        /// Field name
        field: String,
    },

    /// A value did not have the shape an operation required
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// A receiver was missing or not an object
    #[error("Instance member '{member}' requires an object receiver")]
    MissingReceiver {
        /// Member name
        member: String,
    },

    /// Failure raised by a host member body
    #[error("{0}")]
    Raised(String),
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Raised(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Raised(s.to_string())
    }
}
