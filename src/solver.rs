//! Sparse regularized least-squares solver for position inversion
//!
//! The inversion model poses a sparse overdetermined system: anchor rows
//! tie unflagged fixes to their raw values, first- and second-difference
//! rows penalize implied speed and acceleration. No exact factorization is
//! formed. The solve estimates an upper bound on the largest singular
//! value over a few power cycles, then runs a Chebyshev-filtered
//! iteration on the normal equations for a fixed budget, trading certified
//! tolerance for bounded, predictable cost. The Chebyshev convergence
//! bound is reported as a diagnostic, not a pass/fail contract.

use crate::error::{NavError, NavResult};
use nalgebra::DVector;

/// One constraint row: at most three nonzero coefficients
#[derive(Debug, Clone, Copy)]
struct SparseRow {
    cols: [usize; 3],
    vals: [f64; 3],
    len: usize,
    rhs: f64,
}

/// Sparse system with more rows than unknowns, built row by row
#[derive(Debug, Clone)]
pub struct SparseSystem {
    rows: Vec<SparseRow>,
    unknowns: usize,
}

impl SparseSystem {
    pub fn new(unknowns: usize) -> Self {
        Self {
            rows: Vec::new(),
            unknowns,
        }
    }

    pub fn unknowns(&self) -> usize {
        self.unknowns
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Append one row. Coefficients carry their weight already; at most
    /// three nonzeros per row.
    pub fn push_row(&mut self, cols: &[usize], vals: &[f64], rhs: f64) {
        debug_assert!(cols.len() == vals.len() && cols.len() <= 3);
        let mut row = SparseRow {
            cols: [0; 3],
            vals: [0.0; 3],
            len: cols.len(),
            rhs,
        };
        row.cols[..cols.len()].copy_from_slice(cols);
        row.vals[..vals.len()].copy_from_slice(vals);
        self.rows.push(row);
    }

    /// y = A x
    fn apply(&self, x: &DVector<f64>, y: &mut DVector<f64>) {
        for (r, row) in self.rows.iter().enumerate() {
            let mut sum = 0.0;
            for k in 0..row.len {
                sum += row.vals[k] * x[row.cols[k]];
            }
            y[r] = sum;
        }
    }

    /// x = Aᵀ y
    fn apply_transpose(&self, y: &DVector<f64>, x: &mut DVector<f64>) {
        x.fill(0.0);
        for (r, row) in self.rows.iter().enumerate() {
            for k in 0..row.len {
                x[row.cols[k]] += row.vals[k] * y[r];
            }
        }
    }

    /// Aᵀ b for the stored right-hand sides
    fn normal_rhs(&self) -> DVector<f64> {
        let mut out = DVector::zeros(self.unknowns);
        for row in &self.rows {
            for k in 0..row.len {
                out[row.cols[k]] += row.vals[k] * row.rhs;
            }
        }
        out
    }

    fn is_finite(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.rhs.is_finite() && row.vals[..row.len].iter().all(|v| v.is_finite()))
    }
}

/// Result of one solve
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solved unknowns
    pub x: Vec<f64>,
    /// Chebyshev convergence bound after the iteration budget; diagnostic
    pub error_bound: f64,
    /// Final normal-equation residual norm
    pub residual_norm: f64,
    /// Iterations actually run
    pub iterations: usize,
    /// Estimated upper bound on the largest singular value
    pub spectral_bound: f64,
}

/// Iterative solver with a fixed cost envelope
#[derive(Debug, Clone)]
pub struct SmoothingSolver {
    /// Hard cap on Chebyshev iterations per solve
    pub max_iterations: usize,
    /// Power cycles spent refining the spectral upper bound
    pub estimation_cycles: usize,
    /// Ratio between the top of the filtered eigenvalue band and the
    /// bottom; larger ratios damp a wider band per iteration
    pub bandwidth_ratio: f64,
}

impl Default for SmoothingSolver {
    fn default() -> Self {
        Self {
            max_iterations: crate::core::DEFAULT_SOLVER_ITERATIONS,
            estimation_cycles: crate::core::SOLVER_ESTIMATION_CYCLES,
            bandwidth_ratio: crate::core::SOLVER_BANDWIDTH_RATIO,
        }
    }
}

impl SmoothingSolver {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..Default::default()
        }
    }

    /// Solve the system in the least-squares sense.
    ///
    /// Setup problems (no unknowns, underdetermined row set, non-finite
    /// coefficients) are reported as `AllocationFailure`; the caller keeps
    /// whatever state it had.
    pub fn solve(&self, system: &SparseSystem) -> NavResult<Solution> {
        let n = system.unknowns();
        let m = system.rows();
        if n == 0 || m < n || !system.is_finite() {
            return Err(NavError::AllocationFailure { rows: m, cols: n });
        }

        let spectral_bound = self.estimate_spectral_bound(system);
        if spectral_bound <= 0.0 {
            // zero operator; least-squares solution is zero
            return Ok(Solution {
                x: vec![0.0; n],
                error_bound: 0.0,
                residual_norm: 0.0,
                iterations: 0,
                spectral_bound: 0.0,
            });
        }

        // Eigenvalue band of AᵀA the Chebyshev filter is tuned for
        let hi = 1.1 * spectral_bound * spectral_bound;
        let lo = hi / self.bandwidth_ratio;
        let theta = (hi + lo) / 2.0;
        let delta = (hi - lo) / 2.0;
        let sigma1 = theta / delta;

        let rhs = system.normal_rhs();
        let mut x = DVector::zeros(n);
        let mut r = rhs.clone();
        let initial_residual = r.norm();
        if initial_residual == 0.0 {
            return Ok(Solution {
                x: vec![0.0; n],
                error_bound: 0.0,
                residual_norm: 0.0,
                iterations: 0,
                spectral_bound,
            });
        }

        let mut work_m = DVector::zeros(m);
        let mut work_n = DVector::zeros(n);
        let mut d = &r / theta;
        let mut rho = 1.0 / sigma1;
        let mut iterations = 0;

        for _ in 0..self.max_iterations {
            iterations += 1;
            x += &d;

            // r -= AᵀA d
            system.apply(&d, &mut work_m);
            system.apply_transpose(&work_m, &mut work_n);
            r -= &work_n;

            if r.norm() <= 1.0e-14 * initial_residual {
                break;
            }

            let rho_next = 1.0 / (2.0 * sigma1 - rho);
            d = &d * (rho_next * rho) + &r * (2.0 * rho_next / delta);
            rho = rho_next;
        }

        // Chebyshev polynomial decay over the band, as an error envelope
        let kappa = hi / lo;
        let ratio = (kappa.sqrt() - 1.0) / (kappa.sqrt() + 1.0);
        let error_bound = 2.0 * ratio.powi(iterations as i32);

        Ok(Solution {
            x: x.iter().copied().collect(),
            error_bound,
            residual_norm: r.norm(),
            iterations,
            spectral_bound,
        })
    }

    /// Upper bound on the largest singular value, refined by a few power
    /// cycles on AᵀA from a deterministic start vector, padded by a
    /// safety factor so the Chebyshev band always covers the spectrum.
    fn estimate_spectral_bound(&self, system: &SparseSystem) -> f64 {
        let n = system.unknowns();
        let m = system.rows();
        let mut v = DVector::from_fn(n, |i, _| 1.0 + (i % 3) as f64 * 0.5);
        let norm = v.norm();
        if norm > 0.0 {
            v /= norm;
        }

        let mut work_m = DVector::zeros(m);
        let mut work_n = DVector::zeros(n);
        let mut lambda = 0.0;

        for _ in 0..self.estimation_cycles.max(1) {
            system.apply(&v, &mut work_m);
            system.apply_transpose(&work_m, &mut work_n);
            lambda = work_n.norm();
            if lambda <= 0.0 {
                return 0.0;
            }
            v.copy_from(&work_n);
            v /= lambda;
        }

        // power iteration approaches the top of the spectrum from below
        1.25 * lambda.sqrt()
    }
}
