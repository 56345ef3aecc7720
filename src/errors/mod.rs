//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for every pass, grouped into categories
//! - Exit statuses per category
//! - Per-pass diagnostic collections

pub mod errors;
