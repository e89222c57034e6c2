//! Refcheck Core - Foundation Layer for the Refcheck Conformance Engine
//!
//! This crate provides the shared error type and the element type system
//! used by every tensor in the engine. Reference outputs are always `f32`,
//! argmax indices are always `i64`, and integer inputs are promoted through
//! [`Scalar::to_f32`] before any reduction.
//!
//! # Example
//! ```rust
//! use refcheck_core::{DType, Scalar};
//!
//! assert_eq!(<i64 as Scalar>::DTYPE, DType::I64);
//! assert_eq!(7i32.to_f32(), 7.0);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dtype;
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

pub use dtype::{DType, Numeric, Scalar};
pub use error::{Error, Result};
