/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for batched MLS coefficient assembly.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Batched Moving Least Squares (MLS) interpolation coefficients.
//!
//! Moving Least Squares interpolation approximates a field at a target point
//! as a weighted sum of field values known at nearby source points. Given a
//! batch of target points, each paired with a fixed-size neighborhood of
//! source points (typically produced by a k-nearest-neighbor search), this
//! crate computes the per-neighbor interpolation coefficients
//! `p(0) · [Pᵀ·Φ·P]⁻¹ · Pᵀ·Φ` for every target, where `P` is the local
//! Vandermonde matrix of a polynomial reproduction basis and `Φ` is a
//! diagonal matrix of compactly-supported radial weights.
//!
//! The coefficients depend only on geometry: applying them to field data, and
//! producing the neighborhoods in the first place, are left to the caller.
//!
//! # Features
//! - Works in any spatial dimension and any polynomial reproduction degree
//! - Generic over `f32` and `f64` working precision
//! - Closed family of Wendland and Wu weight kernels
//! - Bulk data-parallel over targets via [`rayon`], with a caller-selected
//!   [`ExecutionContext`]
//! - Tolerates rank-deficient local systems through a symmetric
//!   pseudo-inverse rather than failing per target
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra,
//!   avoiding complex build dependencies
//!
//! # Examples
//!
//! ```
//! use faer::mat;
//! use mls_interp::{
//!     moving_least_squares_coefficients, ExecutionContext, MlsConfig,
//!     SourceNeighborhoods, WeightKernel,
//! };
//!
//! // One 1-D target at the origin with two neighbors at -1 and +1.
//! let sources = SourceNeighborhoods::new(mat![[-1.0], [1.0f64]], 2).unwrap();
//! let targets = mat![[0.0f64]];
//!
//! let config = MlsConfig::builder()
//!     .weight_kernel(WeightKernel::Wendland2)
//!     .degree(1)
//!     .build();
//!
//! let coeffs = moving_least_squares_coefficients(
//!     &sources,
//!     &targets,
//!     &config,
//!     &ExecutionContext::default(),
//!     None,
//! )
//! .unwrap();
//!
//! // Linear reproduction: constants are reproduced exactly and the
//! // symmetric neighborhood splits the unit weight evenly.
//! assert!((coeffs[(0, 0)] + coeffs[(0, 1)] - 1.0).abs() < 1e-12);
//! assert!((coeffs[(0, 0)] - coeffs[(0, 1)]).abs() < 1e-12);
//! ```
//!
//! # References
//! 1.  P. Lancaster and K. Salkauskas. Surfaces generated by moving least
//!     squares methods. Math. Comp., 37(155):141-158, 1981.
//! 2.  H. Wendland. Piecewise polynomial, positive definite and compactly
//!     supported radial functions of minimal degree. Adv. Comput. Math.,
//!     4:389-396, 1995.
//! 3.  Z. Wu. Compactly supported positive definite radial functions.
//!     Adv. Comput. Math., 4:283-292, 1995.
//! 4.  Fasshauer, G., 2007. Meshfree Approximation Methods with Matlab.
//!     World Scientific Publishing Co.
pub mod interpolation_config;

mod basis;

mod coefficients;

mod execution;

mod kernels;

mod pseudo_inverse;

pub mod progress;

use faer_traits::RealField;
use num_traits::Float;

pub use {
    basis::basis_size,
    coefficients::{moving_least_squares_coefficients, CoefficientsError, SourceNeighborhoods},
    execution::ExecutionContext,
    interpolation_config::{MlsConfig, MlsConfigBuilder},
    kernels::WeightKernel,
};

/// Working scalar type for the MLS pipeline.
///
/// Blanket-implemented for every type that is both a [`num_traits::Float`]
/// (elementwise kernel and basis arithmetic) and a [`faer_traits::RealField`]
/// (dense eigendecomposition of the moment matrices). In practice this means
/// `f32` and `f64`.
pub trait MlsScalar: Float + RealField + Send + Sync + 'static {}

impl<T> MlsScalar for T where T: Float + RealField + Send + Sync + 'static {}
