/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies kernel and polynomial degree options for configuring MLS coefficient assembly.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies kernel and polynomial degree options for configuring MLS
//! coefficient assembly.

use crate::basis;
use crate::kernels::WeightKernel;
use serde::{Deserialize, Serialize};

/// Configuration of a single coefficient computation.
///
/// Both parameters are fixed for the whole call: the kernel selection is a
/// closed enum dispatched once at entry, and the degree determines the basis
/// size jointly with the point dimensionality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MlsConfig {
    /// The compactly-supported radial kernel weighting each neighbor.
    pub weight_kernel: WeightKernel,

    /// Total degree of the polynomial reproduction basis. Degree 0 reproduces
    /// constants (Shepard-like weights), degree 1 linear fields, and so on.
    /// Reproduction of degree `d` needs at least `basis_size(dim, d)`
    /// well-spread neighbors per target.
    pub degree: usize,
}

impl Default for MlsConfig {
    fn default() -> Self {
        MlsConfig {
            weight_kernel: WeightKernel::default(),
            degree: 2,
        }
    }
}

impl MlsConfig {
    /// Returns a new [`MlsConfigBuilder`] with default settings.
    pub fn builder() -> MlsConfigBuilder {
        MlsConfigBuilder {
            weight_kernel: WeightKernel::default(),
            degree: 2,
        }
    }

    /// Number of polynomial basis terms this configuration produces for
    /// points of the given dimensionality.
    pub fn basis_size(&self, dimensions: usize) -> usize {
        basis::basis_size(dimensions, self.degree)
    }
}

/// A convenience builder for constructing an [`MlsConfig`] instance.
#[derive(Debug, Clone, Copy)]
pub struct MlsConfigBuilder {
    weight_kernel: WeightKernel,
    degree: usize,
}

impl MlsConfigBuilder {
    /// Sets the weight kernel.
    pub fn weight_kernel(mut self, weight_kernel: WeightKernel) -> Self {
        self.weight_kernel = weight_kernel;
        self
    }

    /// Sets the polynomial reproduction degree.
    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    /// Builds and returns an [`MlsConfig`] from the values defined in the
    /// builder.
    pub fn build(self) -> MlsConfig {
        MlsConfig {
            weight_kernel: self.weight_kernel,
            degree: self.degree,
        }
    }
}
