//! Refcheck Tensor - Owned N-Dimensional Arrays
//!
//! Provides the `Tensor` type every reference computation is expressed in.
//! Tensors own their data in row-major order and are never aliased, so each
//! operation produces a fresh value and leaves its inputs untouched.
//!
//! # Key Features
//! - N-dimensional tensor with arbitrary rank
//! - Explicit `NumPy` broadcasting for element-wise operations
//! - Lazy multi-index iteration over any rank
//! - Concatenation with negative-axis wraparound
//! - Deterministic seeded random tensors
//!
//! # Example
//! ```rust
//! use refcheck_tensor::{cat, Tensor};
//!
//! let a = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//! let b = Tensor::<f32>::from_vec(vec![5.0, 6.0, 7.0, 8.0], &[2, 2]).unwrap();
//!
//! let c = cat(&[a.clone(), b.clone()], -1).unwrap();
//! assert_eq!(c.shape(), &[2, 4]);
//!
//! let d = a.add(&b).unwrap();
//! assert_eq!(d.to_vec(), vec![6.0, 8.0, 10.0, 12.0]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Tensor-specific allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_range_loop)]

// =============================================================================
// Module Declarations
// =============================================================================

pub mod creation;
pub mod ops;
pub mod shape;
pub mod tensor;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

pub use creation::{arange, randn_seeded};
pub use ops::sum;
pub use shape::{broadcast_shape, normalize_axis, numel, IndexIter, Shape, Strides};
pub use tensor::Tensor;
pub use view::cat;

pub use refcheck_core::{DType, Error, Numeric, Result, Scalar};
