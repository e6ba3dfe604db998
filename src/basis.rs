/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates the multivariate monomial basis used for local polynomial reproduction.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Multivariate monomial basis of bounded total degree.
//!
//! The basis is ordered by total degree, graded-lexicographically within each
//! degree, so the constant term is always at index 0. Coefficient extraction
//! relies on that placement: evaluating the basis at the local origin yields
//! the unit vector `[1, 0, ..., 0]`.

use num_traits::Float;

/// Number of monomials of total degree at most `degree` in `dimension`
/// variables, i.e. `C(degree + dimension, dimension)`.
pub fn basis_size(dimension: usize, degree: usize) -> usize {
    let mut size = 1usize;
    for i in 1..=dimension {
        // Exact at each step: size holds C(degree + i - 1, i - 1).
        size = size * (degree + i) / i;
    }
    size
}

/// Generates the exponent tuples of the basis in evaluation order.
///
/// For each total degree `0..=degree`, tuples are emitted with earlier
/// dimensions carrying the highest powers first, e.g. in two dimensions and
/// degree 2: `1, x, y, x^2, xy, y^2`.
pub(crate) fn monomial_exponents(dimension: usize, degree: usize) -> Vec<Vec<u32>> {
    let mut exponents = Vec::with_capacity(basis_size(dimension, degree));
    let mut current = vec![0u32; dimension];
    for total in 0..=degree as u32 {
        push_compositions(total, 0, &mut current, &mut exponents);
    }
    exponents
}

fn push_compositions(
    remaining: u32,
    dim_index: usize,
    current: &mut Vec<u32>,
    out: &mut Vec<Vec<u32>>,
) {
    if dim_index + 1 == current.len() {
        current[dim_index] = remaining;
        out.push(current.clone());
        return;
    }
    for exponent in (0..=remaining).rev() {
        current[dim_index] = exponent;
        push_compositions(remaining - exponent, dim_index + 1, current, out);
    }
}

/// Evaluates the basis at a single point, writing one value per monomial.
///
/// `out` must have one slot per exponent tuple.
pub(crate) fn evaluate_basis<T: Float>(coords: &[T], exponents: &[Vec<u32>], out: &mut [T]) {
    debug_assert_eq!(out.len(), exponents.len());
    for (value, powers) in out.iter_mut().zip(exponents) {
        let mut monomial = T::one();
        for (&x, &e) in coords.iter().zip(powers) {
            if e > 0 {
                monomial = monomial * x.powi(e as i32);
            }
        }
        *value = monomial;
    }
}
