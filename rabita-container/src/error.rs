//! Error types for container operations.
//!
//! Every error carries enough context to act on: the key involved, the
//! resolution chain for cycles, and a hint where one helps.

use std::fmt;

use rabita_support::rendering::{render_chain, short_type_name};

use crate::key::BindingKey;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Target type is not constructible: no blueprint is declared for it.
    #[error("{}", .0)]
    NotInstantiable(NotInstantiableError),

    /// Circular dependency detected during resolution.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// Malformed call target: no resolvable method.
    #[error("{}", .0)]
    InvalidArgument(InvalidArgumentError),

    /// A callable parameter could not be filled from any source.
    #[error("{}", .0)]
    MissingArgument(MissingArgumentError),

    /// A constructor or method argument had an unexpected type.
    #[error("{}", .0)]
    TypeMismatch(TypeMismatchError),

    /// A producer or constructor returned an error.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: BindingKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ContainerError {
    /// Wraps a custom construction failure for `key`.
    ///
    /// For construct functions whose own work (I/O, parsing) can fail:
    ///
    /// ```rust,ignore
    /// Blueprint::new("app::Config", |_| {
    ///     let raw = std::fs::read_to_string("config/app.toml")
    ///         .map_err(|e| ContainerError::construction("app::Config", e))?;
    ///     Ok(object(Config::parse(&raw)))
    /// })
    /// ```
    pub fn construction(
        key: impl Into<BindingKey>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ContainerError::ConstructionFailed {
            key: key.into(),
            source: source.into(),
        }
    }
}

/// Error when a key names a type with no declared blueprint.
///
/// Abstract types and trait names are never declared constructible, so
/// resolving them without a binding lands here.
#[derive(Debug)]
pub struct NotInstantiableError {
    /// The key that could not be constructed
    pub key: BindingKey,
    /// What required this key (if resolution got here recursively)
    pub required_by: Option<BindingKey>,
}

impl fmt::Display for NotInstantiableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class `{}` cannot be instantiated", self.key)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        write!(
            f,
            "\n  Hint: declare a blueprint for `{}` or bind the key to a concrete class",
            self.key
        )
    }
}

/// Error when resolution revisits a key already being resolved.
///
/// Shows the full resolution chain so you can see where the cycle closes.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The chain of keys that forms the cycle.
    /// Example: ["A", "B", "C", "A"]
    pub chain: Vec<BindingKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  ")?;
        write!(f, "{}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: break the cycle with a factory binding or restructure the constructors"
        )
    }
}

/// Error for a call target that names no resolvable method.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// The offending call target, as supplied
    pub target: String,
    pub detail: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid call target `{}`: {}", self.target, self.detail)
    }
}

/// Error when a declared callable parameter is neither supplied by name,
/// class-typed, nor defaulted.
#[derive(Debug)]
pub struct MissingArgumentError {
    pub target: String,
    pub parameter: String,
}

impl fmt::Display for MissingArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing argument `{}` for `{}`",
            self.parameter, self.target,
        )?;
        write!(
            f,
            "\n  Hint: supply it by name, give it a class type, or declare a default"
        )
    }
}

/// Error when an assembled argument fails to downcast to the declared type.
#[derive(Debug)]
pub struct TypeMismatchError {
    /// The type the constructor or method expected
    pub expected: &'static str,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Argument type mismatch: expected `{}`",
            short_type_name(self.expected),
        )?;
        write!(
            f,
            "\n  Hint: check the parameter order declared on the blueprint"
        )
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
