/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the compactly-supported radial weight kernels used in MLS coefficient assembly.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Compactly-supported radial basis functions evaluated at normalized distance.
//!
//! Every kernel here satisfies `phi(0) = 1`, is non-negative and
//! monotonically non-increasing on `[0, 1]`, and is identically zero for
//! arguments at or beyond 1. The argument is the neighbor distance divided by
//! the per-target support radius.

use num_traits::Float;
use serde::{Deserialize, Serialize};

#[inline(always)]
fn cast<T: Float>(v: f64) -> T {
    T::from(v).unwrap()
}

/// Wendland kernel of smoothness C0 with `phi(t) = (1-t)^2`.
#[derive(Clone, Debug, Copy)]
pub struct Wendland0;

impl Wendland0 {
    #[inline(always)]
    pub fn phi<T: Float>(t: T) -> T {
        if t >= T::one() {
            return T::zero();
        }
        (T::one() - t).powi(2)
    }
}

/// Wendland kernel of smoothness C2 with `phi(t) = (1-t)^4 (4t+1)`.
#[derive(Clone, Debug, Copy)]
pub struct Wendland2;

impl Wendland2 {
    #[inline(always)]
    pub fn phi<T: Float>(t: T) -> T {
        if t >= T::one() {
            return T::zero();
        }
        (T::one() - t).powi(4) * (cast::<T>(4.0) * t + T::one())
    }
}

/// Wendland kernel of smoothness C4 with `phi(t) = (1-t)^6 (35t^2+18t+3)/3`.
#[derive(Clone, Debug, Copy)]
pub struct Wendland4;

impl Wendland4 {
    #[inline(always)]
    pub fn phi<T: Float>(t: T) -> T {
        if t >= T::one() {
            return T::zero();
        }
        let poly = (cast::<T>(35.0) * t + cast::<T>(18.0)) * t + cast::<T>(3.0);
        (T::one() - t).powi(6) * poly / cast::<T>(3.0)
    }
}

/// Wendland kernel of smoothness C6 with `phi(t) = (1-t)^8 (32t^3+25t^2+8t+1)`.
#[derive(Clone, Debug, Copy)]
pub struct Wendland6;

impl Wendland6 {
    #[inline(always)]
    pub fn phi<T: Float>(t: T) -> T {
        if t >= T::one() {
            return T::zero();
        }
        let poly =
            ((cast::<T>(32.0) * t + cast::<T>(25.0)) * t + cast::<T>(8.0)) * t + T::one();
        (T::one() - t).powi(8) * poly
    }
}

/// Wu kernel of smoothness C2 with `phi(t) = (1-t)^4 (3t^3+12t^2+16t+4)/4`.
#[derive(Clone, Debug, Copy)]
pub struct Wu2;

impl Wu2 {
    #[inline(always)]
    pub fn phi<T: Float>(t: T) -> T {
        if t >= T::one() {
            return T::zero();
        }
        let poly =
            ((cast::<T>(3.0) * t + cast::<T>(12.0)) * t + cast::<T>(16.0)) * t + cast::<T>(4.0);
        (T::one() - t).powi(4) * poly / cast::<T>(4.0)
    }
}

/// Wu kernel of smoothness C4 with `phi(t) = (1-t)^6 (5t^4+30t^3+72t^2+82t+36)/36`.
#[derive(Clone, Debug, Copy)]
pub struct Wu4;

impl Wu4 {
    #[inline(always)]
    pub fn phi<T: Float>(t: T) -> T {
        if t >= T::one() {
            return T::zero();
        }
        let poly = (((cast::<T>(5.0) * t + cast::<T>(30.0)) * t + cast::<T>(72.0)) * t
            + cast::<T>(82.0))
            * t
            + cast::<T>(36.0);
        (T::one() - t).powi(6) * poly / cast::<T>(36.0)
    }
}

/// The closed set of weight kernels accepted by the MLS pipeline.
///
/// Higher Wendland/Wu orders give smoother coefficient fields at the cost of
/// flatter kernels near the support boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightKernel {
    Wendland0,
    Wendland2,
    Wendland4,
    Wendland6,
    Wu2,
    Wu4,
}

impl Default for WeightKernel {
    fn default() -> Self {
        WeightKernel::Wendland0
    }
}

impl WeightKernel {
    /// Resolves the kernel selection to a plain function once per call, so
    /// the per-element weight loops carry no dispatch state.
    #[inline]
    pub(crate) fn evaluator<T: Float>(self) -> fn(T) -> T {
        match self {
            WeightKernel::Wendland0 => Wendland0::phi::<T>,
            WeightKernel::Wendland2 => Wendland2::phi::<T>,
            WeightKernel::Wendland4 => Wendland4::phi::<T>,
            WeightKernel::Wendland6 => Wendland6::phi::<T>,
            WeightKernel::Wu2 => Wu2::phi::<T>,
            WeightKernel::Wu4 => Wu4::phi::<T>,
        }
    }
}
