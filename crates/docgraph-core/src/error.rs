use thiserror::Error;

/// Core error types for docgraph definitions
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown field kind '{kind}' at {path}")]
    UnknownFieldKind { path: String, kind: String },

    #[error("Field definition at {path} has no recognizable shape")]
    MissingShape { path: String },

    #[error("Collection '{0}' is already registered")]
    DuplicateCollection(String),

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Enumerated collection '{collection}' has a value without _id")]
    EnumValueWithoutId { collection: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new UnknownFieldKind error
    pub fn unknown_field_kind(path: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownFieldKind {
            path: path.into(),
            kind: kind.into(),
        }
    }

    /// Create a new MissingShape error
    pub fn missing_shape(path: impl Into<String>) -> Self {
        Self::MissingShape { path: path.into() }
    }

    /// Create a new DuplicateCollection error
    pub fn duplicate_collection(name: impl Into<String>) -> Self {
        Self::DuplicateCollection(name.into())
    }

    /// Create a new InvalidId error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownFieldKind { .. }
            | Self::MissingShape { .. }
            | Self::EnumValueWithoutId { .. } => ErrorCategory::Definition,
            Self::DuplicateCollection(_) => ErrorCategory::Conflict,
            Self::InvalidId(_) => ErrorCategory::Validation,
            Self::JsonError(_) | Self::TomlError(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::System,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Definition,
    Validation,
    Conflict,
    Serialization,
    System,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definition => write!(f, "definition"),
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
