//! # Rabita Support
//!
//! Shared utilities for the Rabita service container.
//!
//! This crate provides:
//! - Text rendering for error messages
//! - Common helpers shared between rabita crates

pub mod rendering;
