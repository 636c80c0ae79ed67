//! Common types module for the EVM transaction manager.
//!
//! This module defines the core data types shared by the attempt builder and
//! its collaborators: fee values, logical transactions, and signed attempts.
//! It provides a centralized location for shared types to ensure consistency
//! across all transaction manager components.

/// Fee pricing types and within-kind comparability.
pub mod fee;
/// Logical transactions, attempts, and unsigned transaction forms.
pub mod tx;

// Re-export all types for convenient access
pub use fee::*;
pub use tx::*;
