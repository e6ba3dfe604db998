/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the batched MLS coefficient pipeline and its input table and error types.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Batched computation of MLS interpolation coefficients.
//!
//! The goal is to compute, for each target point, the line vector
//! `p(0) · [Pᵀ·Φ·P]⁻¹ · Pᵀ·Φ` where:
//! - `p(x)` is the polynomial basis of point `x` (line vector),
//! - `P` is the local Vandermonde matrix built from the source points, i.e.
//!   each line is the polynomial basis of a source point,
//! - `Φ` is the diagonal weight matrix, the kernel evaluated at each source
//!   point.
//!
//! Each neighborhood is first recentered on its target so the evaluation of
//! `p` at the target collapses to `[1 0 ... 0]`, and the extraction reads row
//! 0 of the inverted moment matrix.

use crate::{
    basis,
    execution::ExecutionContext,
    interpolation_config::MlsConfig,
    progress::{bracketed, CoefficientStage, ProgressSink},
    pseudo_inverse, MlsScalar,
};

use faer::{Mat, MatRef, RowRef};
use num_traits::Float;
use rayon::prelude::*;
use std::{
    error::Error,
    fmt,
    sync::Arc,
};

/// Support radius inflation factor. Kernels vanish exactly at normalized
/// distance 1, so the raw farthest-neighbor distance would zero out that
/// neighbor's contribution; 1.1 keeps every neighbor strictly inside.
const SUPPORT_INFLATION: f64 = 1.1;

/// Rectangular [target][neighbor] table of source points.
///
/// Rows are points in the teacher convention of this workspace: the backing
/// matrix has shape `(num_targets * num_neighbors, dim)`, target-major, as a
/// k-nearest-neighbor search naturally produces. The neighbor count is
/// uniform across targets.
#[derive(Debug, Clone)]
pub struct SourceNeighborhoods<T> {
    points: Mat<T>,
    num_neighbors: usize,
}

impl<T: MlsScalar> SourceNeighborhoods<T> {
    /// Wraps a flattened neighborhood table.
    ///
    /// # Errors
    /// - [`CoefficientsError::EmptyNeighborhoods`] if `num_neighbors` is zero.
    /// - [`CoefficientsError::RaggedTable`] if the row count is not a
    ///   multiple of `num_neighbors`.
    pub fn new(points: Mat<T>, num_neighbors: usize) -> Result<Self, CoefficientsError> {
        if num_neighbors == 0 {
            return Err(CoefficientsError::EmptyNeighborhoods);
        }
        if points.nrows() % num_neighbors != 0 {
            return Err(CoefficientsError::RaggedTable {
                rows: points.nrows(),
                num_neighbors,
            });
        }
        Ok(Self {
            points,
            num_neighbors,
        })
    }

    pub fn num_targets(&self) -> usize {
        self.points.nrows() / self.num_neighbors
    }

    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }

    pub fn dimensions(&self) -> usize {
        self.points.ncols()
    }

    /// The `neighbor`-th source point of the `target`-th neighborhood.
    pub fn neighbor(&self, target: usize, neighbor: usize) -> RowRef<'_, T> {
        self.points.row(target * self.num_neighbors + neighbor)
    }

    pub fn points(&self) -> MatRef<'_, T> {
        self.points.as_ref()
    }
}

/// Computes MLS interpolation coefficients for a batch of targets.
///
/// For target `i` with neighbors `j`, the output row `i` holds coefficients
/// such that `sum_j coeff[i][j] * f(source[i][j])` approximates `f(target[i])`
/// for any field `f` that is locally close to a polynomial of the configured
/// degree. The output has the neighborhood table's shape,
/// `(num_targets, num_neighbors)`, and is owned by the caller.
///
/// All structural preconditions are checked before anything is dispatched
/// onto `execution`; there is no partial execution. Rank-deficient local
/// systems (fewer than `basis_size(dim, degree)` usable neighbors) are
/// absorbed by a symmetric pseudo-inverse and produce best-effort rows rather
/// than errors.
///
/// # Errors
/// - [`CoefficientsError::DimensionMismatch`] if source and target points
///   disagree on dimensionality.
/// - [`CoefficientsError::ZeroDimension`] for zero-dimensional points.
/// - [`CoefficientsError::TargetCountMismatch`] if the neighborhood table and
///   the target sequence disagree on the number of targets.
pub fn moving_least_squares_coefficients<T: MlsScalar>(
    source_points: &SourceNeighborhoods<T>,
    target_points: &Mat<T>,
    config: &MlsConfig,
    execution: &ExecutionContext,
    progress_callback: Option<Arc<dyn ProgressSink>>,
) -> Result<Mat<T>, CoefficientsError> {
    if source_points.dimensions() != target_points.ncols() {
        return Err(CoefficientsError::DimensionMismatch {
            source_dim: source_points.dimensions(),
            target_dim: target_points.ncols(),
        });
    }
    if source_points.dimensions() == 0 {
        return Err(CoefficientsError::ZeroDimension);
    }
    if source_points.num_targets() != target_points.nrows() {
        return Err(CoefficientsError::TargetCountMismatch {
            neighborhood_targets: source_points.num_targets(),
            num_targets: target_points.nrows(),
        });
    }

    let num_targets = source_points.num_targets();
    let num_neighbors = source_points.num_neighbors();
    let dim = source_points.dimensions();

    let exponents = basis::monomial_exponents(dim, config.degree);
    let poly_size = exponents.len();
    let phi = config.weight_kernel.evaluator::<T>();
    let sink = progress_callback;

    let coefficients = execution.install(|| {
        let relative = bracketed(&sink, CoefficientStage::Translation, || {
            translate_to_targets(source_points, target_points)
        });

        let radii = bracketed(&sink, CoefficientStage::Radii, || {
            support_radii(&relative, num_targets, num_neighbors, dim)
        });

        let weights = bracketed(&sink, CoefficientStage::Weights, || {
            kernel_weights(&relative, &radii, dim, num_neighbors, phi)
        });

        let vandermonde = bracketed(&sink, CoefficientStage::Vandermonde, || {
            vandermonde_table(&relative, &exponents, dim)
        });

        let mut moments = bracketed(&sink, CoefficientStage::Moment, || {
            moment_matrices(&vandermonde, &weights, num_targets, num_neighbors, poly_size)
        });

        bracketed(&sink, CoefficientStage::PseudoInverse, || {
            pseudo_inverse::symmetric_pseudo_inverse_batch(&mut moments)
        });

        bracketed(&sink, CoefficientStage::Coefficients, || {
            extract_coefficients(
                &moments,
                &vandermonde,
                &weights,
                num_targets,
                num_neighbors,
                poly_size,
            )
        })
    });

    Ok(coefficients)
}

#[inline(always)]
fn euclidean_norm<T: MlsScalar>(coords: &[T]) -> T {
    let mut sum = T::zero();
    for &c in coords {
        sum = sum + c * c;
    }
    Float::sqrt(sum)
}

/// Stage 1: recenters every neighbor on its target, so each target becomes
/// the local origin. Row-major `(num_targets * num_neighbors, dim)` layout.
fn translate_to_targets<T: MlsScalar>(
    sources: &SourceNeighborhoods<T>,
    targets: &Mat<T>,
) -> Vec<T> {
    let dim = sources.dimensions();
    let num_neighbors = sources.num_neighbors();
    let mut relative = vec![T::zero(); sources.points().nrows() * dim];

    relative
        .par_chunks_mut(dim)
        .enumerate()
        .for_each(|(row, out)| {
            let source = sources.neighbor(row / num_neighbors, row % num_neighbors);
            let target = targets.row(row / num_neighbors);
            for ((value, s), t) in out.iter_mut().zip(source.iter()).zip(target.iter()) {
                *value = *s - *t;
            }
        });

    relative
}

/// Stage 2: per-target support radius, the farthest neighbor distance
/// floored at machine epsilon and inflated by [`SUPPORT_INFLATION`]. Never
/// zero, so the normalized distances of stage 3 are always well-defined.
fn support_radii<T: MlsScalar>(
    relative: &[T],
    num_targets: usize,
    num_neighbors: usize,
    dim: usize,
) -> Vec<T> {
    let inflation = T::from(SUPPORT_INFLATION).unwrap();

    (0..num_targets)
        .into_par_iter()
        .map(|i| {
            let mut radius = <T as Float>::epsilon();
            for j in 0..num_neighbors {
                let start = (i * num_neighbors + j) * dim;
                let norm = euclidean_norm(&relative[start..start + dim]);
                radius = Float::max(radius, norm);
            }
            inflation * radius
        })
        .collect()
}

/// Stage 3: kernel weight of every neighbor at its normalized distance.
fn kernel_weights<T: MlsScalar>(
    relative: &[T],
    radii: &[T],
    dim: usize,
    num_neighbors: usize,
    phi: fn(T) -> T,
) -> Vec<T> {
    let mut weights = vec![T::zero(); radii.len() * num_neighbors];

    weights
        .par_chunks_mut(num_neighbors)
        .enumerate()
        .for_each(|(i, out)| {
            for (j, weight) in out.iter_mut().enumerate() {
                let start = (i * num_neighbors + j) * dim;
                let norm = euclidean_norm(&relative[start..start + dim]);
                *weight = phi(norm / radii[i]);
            }
        });

    weights
}

/// Stage 4: polynomial basis of every recentered neighbor, one row of
/// `poly_size` values per (target, neighbor) cell.
fn vandermonde_table<T: MlsScalar>(relative: &[T], exponents: &[Vec<u32>], dim: usize) -> Vec<T> {
    let poly_size = exponents.len();
    let rows = relative.len() / dim;
    let mut table = vec![T::zero(); rows * poly_size];

    table
        .par_chunks_mut(poly_size)
        .enumerate()
        .for_each(|(row, out)| {
            basis::evaluate_basis(&relative[row * dim..(row + 1) * dim], exponents, out);
        });

    table
}

/// Stage 5: the moment matrix `A = Pᵀ·Φ·P` of each target, symmetric by
/// construction. Parallel over targets, serial reduction over neighbors.
fn moment_matrices<T: MlsScalar>(
    vandermonde: &[T],
    weights: &[T],
    num_targets: usize,
    num_neighbors: usize,
    poly_size: usize,
) -> Vec<Mat<T>> {
    (0..num_targets)
        .into_par_iter()
        .map(|i| {
            Mat::from_fn(poly_size, poly_size, |j, k| {
                let mut sum = T::zero();
                for l in 0..num_neighbors {
                    let row = i * num_neighbors + l;
                    sum = sum
                        + vandermonde[row * poly_size + j]
                            * vandermonde[row * poly_size + k]
                            * weights[row];
                }
                sum
            })
        })
        .collect()
}

/// Stage 6: `coeff[i][j] = sum_k A⁻¹[i][0][k] · P[i][j][k] · w[i][j]`.
///
/// Row 0 of the inverted moment matrix is `p(0)·A⁻¹` because the basis
/// places the constant term first.
fn extract_coefficients<T: MlsScalar>(
    moments: &[Mat<T>],
    vandermonde: &[T],
    weights: &[T],
    num_targets: usize,
    num_neighbors: usize,
    poly_size: usize,
) -> Mat<T> {
    let mut coefficients = vec![T::zero(); num_targets * num_neighbors];

    coefficients
        .par_chunks_mut(num_neighbors)
        .enumerate()
        .for_each(|(i, out)| {
            let inverse = &moments[i];
            for (j, coefficient) in out.iter_mut().enumerate() {
                let row = i * num_neighbors + j;
                let mut sum = T::zero();
                for k in 0..poly_size {
                    sum = sum + inverse[(0, k)] * vandermonde[row * poly_size + k];
                }
                *coefficient = sum * weights[row];
            }
        });

    MatRef::from_row_major_slice(coefficients.as_slice(), num_targets, num_neighbors).to_owned()
}

/// Errors reported before any parallel work is dispatched.
///
/// These are structural precondition violations; the call never partially
/// executes. Numerical degeneracy inside the pipeline is absorbed by the
/// pseudo-inverse and is deliberately not represented here.
#[derive(Debug)]
pub enum CoefficientsError {
    /// Source and target points disagree on dimensionality.
    DimensionMismatch { source_dim: usize, target_dim: usize },

    /// The neighborhood table and target sequence disagree on target count.
    TargetCountMismatch {
        neighborhood_targets: usize,
        num_targets: usize,
    },

    /// The flattened table's row count is not a multiple of the neighbor
    /// count.
    RaggedTable { rows: usize, num_neighbors: usize },

    /// A neighborhood table with zero neighbors per target.
    EmptyNeighborhoods,

    /// Zero-dimensional points.
    ZeroDimension,
}

impl fmt::Display for CoefficientsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoefficientsError::DimensionMismatch {
                source_dim,
                target_dim,
            } => {
                write!(
                    f,
                    "source points have dimension {source_dim} but target points have dimension {target_dim}"
                )
            }
            CoefficientsError::TargetCountMismatch {
                neighborhood_targets,
                num_targets,
            } => {
                write!(
                    f,
                    "neighborhood table holds {neighborhood_targets} targets but {num_targets} target points were given"
                )
            }
            CoefficientsError::RaggedTable {
                rows,
                num_neighbors,
            } => {
                write!(
                    f,
                    "{rows} source rows cannot form uniform neighborhoods of {num_neighbors}"
                )
            }
            CoefficientsError::EmptyNeighborhoods => {
                write!(f, "neighborhoods must contain at least one source point")
            }
            CoefficientsError::ZeroDimension => {
                write!(f, "points must have at least one coordinate")
            }
        }
    }
}

impl Error for CoefficientsError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::WeightKernel;
    use faer::mat;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const ALL_KERNELS: [WeightKernel; 6] = [
        WeightKernel::Wendland0,
        WeightKernel::Wendland2,
        WeightKernel::Wendland4,
        WeightKernel::Wendland6,
        WeightKernel::Wu2,
        WeightKernel::Wu4,
    ];

    fn compute(
        sources: Mat<f64>,
        num_neighbors: usize,
        targets: Mat<f64>,
        config: MlsConfig,
    ) -> Mat<f64> {
        let sources = SourceNeighborhoods::new(sources, num_neighbors).unwrap();
        moving_least_squares_coefficients(
            &sources,
            &targets,
            &config,
            &ExecutionContext::default(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn symmetric_pair_splits_the_unit_weight() {
        // One 1-D target at the origin, neighbors at -1 and +1, degree 1.
        // Constant reproduction forces the sum to 1 and linear reproduction
        // forces the antisymmetric part to 0, for any admissible kernel.
        for kernel in ALL_KERNELS {
            let config = MlsConfig::builder().weight_kernel(kernel).degree(1).build();
            let coeffs = compute(mat![[-1.0], [1.0f64]], 2, mat![[0.0f64]], config);

            assert!(
                (coeffs[(0, 0)] + coeffs[(0, 1)] - 1.0).abs() < 1e-12,
                "{kernel:?}: coefficients do not sum to one"
            );
            assert!(
                (coeffs[(0, 1)] - coeffs[(0, 0)]).abs() < 1e-12,
                "{kernel:?}: symmetric neighbors got asymmetric coefficients"
            );
        }
    }

    #[test]
    fn equidistant_triangle_shares_weight_evenly() {
        // 2-D, degree 0: three neighbors equidistant and symmetric around
        // the target give equal weights and coefficients of 1/3.
        let target = (0.5, -0.25);
        let radius = 0.6;
        let mut sources = Mat::<f64>::zeros(3, 2);
        for (k, angle_deg) in [90.0, 210.0, 330.0].iter().enumerate() {
            let angle = angle_deg * std::f64::consts::PI / 180.0;
            sources[(k, 0)] = target.0 + radius * angle.cos();
            sources[(k, 1)] = target.1 + radius * angle.sin();
        }

        let config = MlsConfig::builder().degree(0).build();
        let coeffs = compute(sources, 3, mat![[target.0, target.1]], config);

        for j in 0..3 {
            assert!((coeffs[(0, j)] - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn reproduces_quadratics_in_2d() {
        // A 3x3 stencil has 9 affinely-independent points, enough for the
        // 6-term quadratic basis.
        let target = (0.3, -0.2);
        let spacing = 0.7;
        let mut sources = Mat::<f64>::zeros(9, 2);
        let mut row = 0;
        for dx in [-1.0, 0.0, 1.0] {
            for dy in [-1.0, 0.0, 1.0] {
                sources[(row, 0)] = target.0 + spacing * dx;
                sources[(row, 1)] = target.1 + spacing * (dy + 0.1 * dx);
                row += 1;
            }
        }

        let f = |x: f64, y: f64| 2.0 + x - 3.0 * y + 0.5 * x * x - x * y + y * y;

        let config = MlsConfig::builder()
            .weight_kernel(WeightKernel::Wendland2)
            .degree(2)
            .build();
        let sources = SourceNeighborhoods::new(sources, 9).unwrap();
        let coeffs = moving_least_squares_coefficients(
            &sources,
            &mat![[target.0, target.1]],
            &config,
            &ExecutionContext::default(),
            None,
        )
        .unwrap();

        let mut interpolated = 0.0;
        let mut coefficient_sum = 0.0;
        for j in 0..9 {
            let p = sources.neighbor(0, j);
            interpolated += coeffs[(0, j)] * f(p[0], p[1]);
            coefficient_sum += coeffs[(0, j)];
        }

        assert!((interpolated - f(target.0, target.1)).abs() < 1e-8);
        assert!((coefficient_sum - 1.0).abs() < 1e-8);
    }

    #[test]
    fn degree_zero_rows_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(42);
        let num_targets = 4;
        let num_neighbors = 5;
        let sources = Mat::from_fn(num_targets * num_neighbors, 3, |_, _| {
            rng.random_range(0.0..1.0)
        });
        let targets = Mat::from_fn(num_targets, 3, |_, _| rng.random_range(0.0..1.0));

        let config = MlsConfig::builder().degree(0).build();
        let coeffs = compute(sources, num_neighbors, targets, config);

        for i in 0..num_targets {
            let row_sum: f64 = (0..num_neighbors).map(|j| coeffs[(i, j)]).sum();
            assert!((row_sum - 1.0).abs() < 1e-12, "target {i} sums to {row_sum}");
        }
    }

    #[test]
    fn coincident_neighbors_stay_finite() {
        // All neighbors exactly on the target: the radius floors at machine
        // epsilon, every weight is phi(0) = 1, and the rank-one moment
        // matrix pseudo-inverts to an even 1/n split.
        let num_neighbors = 4;
        let sources = Mat::from_fn(num_neighbors, 2, |_, d| if d == 0 { 1.0 } else { 2.0 });
        let config = MlsConfig::builder().degree(2).build();
        let coeffs = compute(sources, num_neighbors, mat![[1.0, 2.0f64]], config);

        for j in 0..num_neighbors {
            assert!(coeffs[(0, j)].is_finite());
            assert!((coeffs[(0, j)] - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn output_shape_matches_neighborhood_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let num_targets = 5;
        let num_neighbors = 4;
        let sources = Mat::from_fn(num_targets * num_neighbors, 3, |_, _| {
            rng.random_range(-1.0..1.0)
        });
        let targets = Mat::from_fn(num_targets, 3, |_, _| rng.random_range(-1.0..1.0));

        let coeffs = compute(sources, num_neighbors, targets, MlsConfig::default());
        assert_eq!(coeffs.nrows(), num_targets);
        assert_eq!(coeffs.ncols(), num_neighbors);
    }

    #[test]
    fn empty_batch_is_valid() {
        let sources = Mat::<f64>::zeros(0, 2);
        let targets = Mat::<f64>::zeros(0, 2);
        let coeffs = compute(sources, 3, targets, MlsConfig::default());
        assert_eq!(coeffs.nrows(), 0);
        assert_eq!(coeffs.ncols(), 3);
    }

    #[test]
    fn moment_matrices_are_exactly_symmetric() {
        let mut rng = StdRng::seed_from_u64(3);
        let num_targets = 3;
        let num_neighbors = 7;
        let dim = 2;
        let sources = SourceNeighborhoods::new(
            Mat::from_fn(num_targets * num_neighbors, dim, |_, _| {
                rng.random_range(-1.0..1.0)
            }),
            num_neighbors,
        )
        .unwrap();
        let targets = Mat::from_fn(num_targets, dim, |_, _| rng.random_range(-1.0..1.0));

        let exponents = basis::monomial_exponents(dim, 2);
        let poly_size = exponents.len();
        let phi = WeightKernel::Wendland2.evaluator::<f64>();

        let relative = translate_to_targets(&sources, &targets);
        let radii = support_radii(&relative, num_targets, num_neighbors, dim);
        let weights = kernel_weights(&relative, &radii, dim, num_neighbors, phi);
        let vandermonde = vandermonde_table(&relative, &exponents, dim);
        let moments = moment_matrices(&vandermonde, &weights, num_targets, num_neighbors, poly_size);

        for a in &moments {
            for j in 0..poly_size {
                for k in 0..poly_size {
                    assert_eq!(a[(j, k)], a[(k, j)]);
                }
            }
        }
    }

    fn linear_reproduction_error<T: MlsScalar>() -> T {
        // 1-D, degree 1: interpolate f(x) = 1 + 2x at x = 0.2 from four
        // scattered neighbors.
        let xs = [-0.8, 0.7, 1.2, -0.3];
        let target_x = 0.2;

        let sources = SourceNeighborhoods::new(
            Mat::from_fn(4, 1, |i, _| T::from(xs[i]).unwrap()),
            4,
        )
        .unwrap();
        let targets = Mat::from_fn(1, 1, |_, _| T::from(target_x).unwrap());

        let config = MlsConfig::builder().degree(1).build();
        let coeffs = moving_least_squares_coefficients(
            &sources,
            &targets,
            &config,
            &ExecutionContext::default(),
            None,
        )
        .unwrap();

        let two = T::from(2.0).unwrap();
        let mut interpolated = T::zero();
        for (j, &x) in xs.iter().enumerate() {
            let fx = T::one() + two * T::from(x).unwrap();
            interpolated = interpolated + coeffs[(0, j)] * fx;
        }
        let expected = T::one() + two * T::from(target_x).unwrap();
        Float::abs(interpolated - expected)
    }

    #[test]
    fn reproduction_holds_at_both_precisions() {
        // Each precision reproduces the linear field within its own
        // tolerance; f32 is looser but still tight.
        assert!(linear_reproduction_error::<f64>() < 1e-12);
        assert!(linear_reproduction_error::<f32>() < 1e-4);
    }

    #[test]
    fn execution_contexts_agree() {
        let mut rng = StdRng::seed_from_u64(11);
        let num_targets = 6;
        let num_neighbors = 8;
        let sources = SourceNeighborhoods::new(
            Mat::from_fn(num_targets * num_neighbors, 2, |_, _| {
                rng.random_range(-1.0..1.0)
            }),
            num_neighbors,
        )
        .unwrap();
        let targets = Mat::from_fn(num_targets, 2, |_, _| rng.random_range(-1.0..1.0));
        let config = MlsConfig::builder().degree(1).build();

        let parallel = moving_least_squares_coefficients(
            &sources,
            &targets,
            &config,
            &ExecutionContext::GlobalPool,
            None,
        )
        .unwrap();
        let sequential = moving_least_squares_coefficients(
            &sources,
            &targets,
            &config,
            &ExecutionContext::Sequential,
            None,
        )
        .unwrap();

        for i in 0..num_targets {
            for j in 0..num_neighbors {
                assert_eq!(parallel[(i, j)], sequential[(i, j)]);
            }
        }
    }

    #[test]
    fn progress_sink_sees_every_stage_bracketed() {
        use crate::progress::{closure_sink, ProgressMsg};
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_handler = Arc::clone(&seen);
        let (sink, handle) = closure_sink(32, move |msg| {
            seen_in_handler.lock().unwrap().push(msg);
        });

        let sources =
            SourceNeighborhoods::new(mat![[-1.0], [0.5], [1.0f64]], 3).unwrap();
        moving_least_squares_coefficients(
            &sources,
            &mat![[0.0f64]],
            &MlsConfig::default(),
            &ExecutionContext::default(),
            Some(sink),
        )
        .unwrap();

        handle.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 14, "each of the 7 stages emits start + finish");
        assert_eq!(
            seen[0],
            ProgressMsg::StageStarted {
                stage: CoefficientStage::Translation
            }
        );
        assert_eq!(
            seen[13],
            ProgressMsg::StageFinished {
                stage: CoefficientStage::Coefficients
            }
        );
        for pair in seen.chunks(2) {
            match (&pair[0], &pair[1]) {
                (
                    ProgressMsg::StageStarted { stage: started },
                    ProgressMsg::StageFinished { stage: finished },
                ) => assert_eq!(started, finished),
                other => panic!("unpaired progress events: {other:?}"),
            }
        }
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let sources = SourceNeighborhoods::new(Mat::<f64>::zeros(4, 2), 2).unwrap();
        let targets = Mat::<f64>::zeros(2, 3);
        let err = moving_least_squares_coefficients(
            &sources,
            &targets,
            &MlsConfig::default(),
            &ExecutionContext::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoefficientsError::DimensionMismatch {
                source_dim: 2,
                target_dim: 3
            }
        ));
    }

    #[test]
    fn target_count_mismatch_is_rejected() {
        let sources = SourceNeighborhoods::new(Mat::<f64>::zeros(6, 2), 2).unwrap();
        let targets = Mat::<f64>::zeros(2, 2);
        let err = moving_least_squares_coefficients(
            &sources,
            &targets,
            &MlsConfig::default(),
            &ExecutionContext::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoefficientsError::TargetCountMismatch {
                neighborhood_targets: 3,
                num_targets: 2
            }
        ));
    }

    #[test]
    fn malformed_tables_are_rejected_at_construction() {
        assert!(matches!(
            SourceNeighborhoods::new(Mat::<f64>::zeros(7, 2), 3),
            Err(CoefficientsError::RaggedTable {
                rows: 7,
                num_neighbors: 3
            })
        ));
        assert!(matches!(
            SourceNeighborhoods::new(Mat::<f64>::zeros(4, 2), 0),
            Err(CoefficientsError::EmptyNeighborhoods)
        ));
    }

    #[test]
    fn zero_dimensional_points_are_rejected() {
        let sources = SourceNeighborhoods::new(Mat::<f64>::zeros(4, 0), 2).unwrap();
        let targets = Mat::<f64>::zeros(2, 0);
        let err = moving_least_squares_coefficients(
            &sources,
            &targets,
            &MlsConfig::default(),
            &ExecutionContext::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CoefficientsError::ZeroDimension));
    }
}
