/////////////////////////////////////////////////////////////////////////////////////////////
//
// Computes batched Moore-Penrose pseudo-inverses of symmetric moment matrices.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Symmetric pseudo-inverse of the per-target moment matrices.
//!
//! The moment matrix of a target is rank-deficient whenever its neighborhood
//! is too small or too degenerate for the requested polynomial degree. The
//! pseudo-inverse treats near-zero eigen-directions as contributing zero to
//! the inverse instead of failing, so a degenerate target yields a best-effort
//! coefficient vector rather than an error.

use crate::MlsScalar;
use faer::{Mat, Side};
use num_traits::Float;
use rayon::prelude::*;

/// Replaces every matrix in the batch by its Moore-Penrose pseudo-inverse.
///
/// Matrices are assumed symmetric; only real spectra are handled.
pub(crate) fn symmetric_pseudo_inverse_batch<T: MlsScalar>(matrices: &mut [Mat<T>]) {
    matrices
        .par_iter_mut()
        .for_each(|a| symmetric_pseudo_inverse(a));
}

/// In-place pseudo-inverse of a single symmetric matrix via its
/// eigendecomposition `A = U diag(lambda) U^T`.
///
/// Eigenvalues below `max|lambda| * eps * n` are clamped to contribute zero.
pub(crate) fn symmetric_pseudo_inverse<T: MlsScalar>(a: &mut Mat<T>) {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());

    let eigen = match a.as_ref().self_adjoint_eigen(Side::Lower) {
        Ok(eigen) => eigen,
        // Non-finite entries are the only way the decomposition can fail;
        // the contract absorbs them as a zero contribution.
        Err(_) => {
            a.fill(T::zero());
            return;
        }
    };

    let u = eigen.U();
    let s = eigen.S();

    let mut scale = T::zero();
    for k in 0..n {
        scale = Float::max(scale, Float::abs(s[k]));
    }
    let tolerance = scale * <T as Float>::epsilon() * T::from(n).unwrap();

    // Retained spectrum, inverted. A zero matrix stays zero.
    let mut inverted = vec![T::zero(); n];
    for (k, lambda_inv) in inverted.iter_mut().enumerate() {
        let lambda = s[k];
        if Float::abs(lambda) > tolerance {
            *lambda_inv = T::one() / lambda;
        }
    }

    // A^+ = U diag(1/lambda) U^T, written back over the input. The matrices
    // here are small (poly_size squared), so explicit loops beat a matmul.
    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::zero();
            for k in 0..n {
                sum = sum + u[(i, k)] * u[(j, k)] * inverted[k];
            }
            a[(i, j)] = sum;
            a[(j, i)] = sum;
        }
    }
}
