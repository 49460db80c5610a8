//! Core container implementation for Rabita.

pub mod binding;
pub mod blueprint;
pub mod container;
pub mod error;
pub mod invoke;
pub mod key;
pub mod provider;

pub use container::prelude;
pub use error::{ContainerError, Result};
pub use key::BindingKey;
