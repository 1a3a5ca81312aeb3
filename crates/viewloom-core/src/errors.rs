use thiserror::Error;

/// Result type alias using ViewLoomError
pub type Result<T> = std::result::Result<T, ViewLoomError>;

/// Comprehensive error taxonomy for ViewLoom operations
///
/// Every failure raised by template validation, generation or application
/// carries enough context (node name, field, expected/found descriptions)
/// to diagnose the offending position. None of these errors are retried;
/// a raised error aborts the whole `generate`/`create`/`update` call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewLoomError {
    // ===== Structural Errors =====
    /// Event stream does not match the template at the given node
    #[error("Structural mismatch at node '{node}': expected {expected}, found {found}")]
    StructuralMismatch {
        node: String,
        expected: String,
        found: String,
    },

    /// Polymorphic object node has no discriminator event among its children
    #[error("Polymorphic node '{node}' has no discriminator event")]
    DiscriminatorMissing { node: String },

    /// Discriminator value does not map to any declared subtype
    #[error("Discriminator value '{value}' does not map to a subtype of {declared}")]
    DiscriminatorUnresolvable { declared: String, value: String },

    /// Template violates a structural invariant
    #[error("Invalid template at node '{node}': {reason}")]
    TemplateInvalid { node: String, reason: String },

    // ===== Resolution Errors =====
    /// No reference resolver claimed the type, or the resolver returned nothing
    #[error("Unresolved reference of type {declared} at node '{node}'")]
    ReferenceUnresolved { declared: String, node: String },

    /// No factory produced an instance and no default constructor is registered
    #[error("Cannot instantiate {declared}: no factory matched and no default constructor is registered")]
    InstantiationFailed { declared: String },

    /// More than one entry in a single scope matches a by-type query
    #[error("Ambiguous scope lookup for {type_name}: {count} entries match in one scope")]
    AmbiguousScopeLookup { type_name: String, count: usize },

    /// A required strategy could not be found through the scope mechanism
    #[error("Missing {strategy} for node '{node}'")]
    StrategyMissing { strategy: String, node: String },

    // ===== Type / Conversion Errors =====
    /// Wrong runtime type supplied to `update`, or an incompatible subtype
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// No converter chain member supports a declared value type
    #[error("No value converter supports {value_type} at node '{node}'")]
    ConversionUnsupported { value_type: String, node: String },

    /// A converter accepted the type but failed on the concrete value
    #[error("Conversion failed at node '{node}': {reason}")]
    ConversionFailed { node: String, reason: String },

    /// Model accessor refused a write (unknown field or wrong value shape)
    #[error("Accessor rejected {operation} for field '{field}' on {model_type}")]
    AccessorRejected {
        operation: String,
        field: String,
        model_type: String,
    },

    // ===== Collaborator Errors =====
    /// A splice handler or URL resolver reported a failure
    #[error("External handler failed at node '{node}': {reason}")]
    HandlerFailed { node: String, reason: String },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}
