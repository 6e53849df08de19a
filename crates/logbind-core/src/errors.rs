use thiserror::Error;

/// Result type alias using LogBindError
pub type Result<T> = std::result::Result<T, LogBindError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that configuration loaders can match
/// on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LbErrorKind {
    // Binding
    ConfigurationBinding,
    UnknownProperty,
    MissingRequired,

    // Engine setup
    InvalidConfig,
}

impl LbErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            LbErrorKind::ConfigurationBinding => "ERR_CONFIGURATION_BINDING",
            LbErrorKind::UnknownProperty => "ERR_UNKNOWN_PROPERTY",
            LbErrorKind::MissingRequired => "ERR_MISSING_REQUIRED",
            LbErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// Flattens every [`LogBindError`] into classification fields plus the
/// binding context (target type, property, offending raw value).
#[derive(Debug, Clone)]
pub struct LbError {
    kind: LbErrorKind,
    op: Option<String>,
    type_name: Option<String>,
    property: Option<String>,
    value: Option<String>,
    message: String,
}

impl LbError {
    /// Create a new error with the specified kind
    pub fn new(kind: LbErrorKind) -> Self {
        Self {
            kind,
            op: None,
            type_name: None,
            property: None,
            value: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add target type context
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Add property context
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Add raw value context
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> LbErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for LbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, " (type: {})", type_name)?;
        }
        if let Some(property) = &self.property {
            write!(f, " (property: {})", property)?;
        }
        if let Some(value) = &self.value {
            write!(f, " (value: '{}')", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for LbError {}

// ========== End Error Facility ==========

/// Error taxonomy for configuration-time operations
///
/// Projection never produces these; see `project` for the recovery policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogBindError {
    /// A raw value could not be converted or assigned
    #[error("'{type_name}' cannot assign property '{property}'='{value}'. Error: {cause}")]
    ConfigurationBinding {
        type_name: String,
        property: String,
        value: String,
        cause: String,
    },

    /// The target type has no bindable property with this name
    #[error("Parameter {property} not supported on {type_name}")]
    UnknownProperty { type_name: String, property: String },

    /// A mandatory property was left without a value
    #[error("Required parameter '{property}' on '{type_name}' was not specified.")]
    MissingRequiredParameter { type_name: String, property: String },

    /// Engine configuration rejected
    #[error("Invalid engine configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<LogBindError> for LbError {
    fn from(err: LogBindError) -> Self {
        match err {
            LogBindError::ConfigurationBinding {
                type_name,
                property,
                value,
                cause,
            } => LbError::new(LbErrorKind::ConfigurationBinding)
                .with_op("bind")
                .with_type_name(type_name)
                .with_property(property)
                .with_value(value)
                .with_message(cause),

            LogBindError::UnknownProperty {
                type_name,
                property,
            } => LbError::new(LbErrorKind::UnknownProperty)
                .with_op("bind")
                .with_type_name(type_name)
                .with_property(property)
                .with_message("Parameter not supported"),

            LogBindError::MissingRequiredParameter {
                type_name,
                property,
            } => LbError::new(LbErrorKind::MissingRequired)
                .with_op("validate_required")
                .with_type_name(type_name)
                .with_property(property)
                .with_message("Required parameter was not specified"),

            LogBindError::InvalidConfig { reason } => {
                LbError::new(LbErrorKind::InvalidConfig).with_message(reason)
            }
        }
    }
}

impl From<toml::de::Error> for LogBindError {
    fn from(err: toml::de::Error) -> Self {
        LogBindError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
