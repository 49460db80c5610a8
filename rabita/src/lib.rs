//! # Rabita — string-keyed service container for Rust
//!
//! A runtime dependency-injection container with a string-keyed registry:
//! bindings are keyed by strings (type paths, trait names, plain aliases),
//! constructor graphs auto-wire through declared blueprints, and singleton
//! instances are cached for the container's lifetime.

pub use rabita_container::*;
pub use rabita_support::*;
