//! Box-constrained nonlinear least squares.
//!
//! Minimizes `f(p) = Σ r_k(p)²` subject to `lower ≤ p ≤ upper` with projected
//! Gauss-Newton steps and Armijo backtracking. The Gauss-Newton direction is
//! the minimum-norm solution `d = −Jᵀ (J Jᵀ + μI)⁻¹ r`, which suits problems
//! with far fewer residuals than unknowns.

use gpe_math::{DMat, DVec, Real};

/// A residual vector and its Jacobian.
pub trait Residuals {
    /// Residuals `r(p)`, length `m`.
    fn residuals(&self, p: &DVec) -> DVec;
    /// Jacobian `∂r/∂p`, shape `m × n`.
    fn jacobian(&self, p: &DVec) -> DMat;
}

/// Per-coordinate box constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: DVec,
    pub upper: DVec,
}

impl Bounds {
    /// Box `[c_i − radius, c_i + radius]` around `center`.
    pub fn around(center: &DVec, radius: Real) -> Self {
        let radius = radius.abs();
        Self {
            lower: center.map(|c| c - radius),
            upper: center.map(|c| c + radius),
        }
    }

    /// Clamp `p` into the box.
    pub fn project(&self, p: &mut DVec) {
        for i in 0..p.len() {
            p[i] = p[i].clamp(self.lower[i], self.upper[i]);
        }
    }

    pub fn contains(&self, p: &DVec) -> bool {
        (0..p.len()).all(|i| p[i] >= self.lower[i] && p[i] <= self.upper[i])
    }
}

/// Minimizer configuration.
#[derive(Debug, Clone)]
pub struct MinimizerConfig {
    /// Maximum number of Gauss-Newton iterations.
    pub max_iter: usize,
    /// Stop when `f_prev − f ≤ ftol · max(|f_prev|, |f|, 1)`.
    pub ftol: Real,
    /// Step shrink factor for Armijo backtracking.
    pub shrink: Real,
    /// Armijo sufficient decrease parameter.
    pub armijo_c: Real,
    /// Minimum step length before declaring failure.
    pub min_step: Real,
    /// Tikhonov damping μ of the normal equations.
    pub damping: Real,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            ftol: 1e-14,
            shrink: 0.5,
            armijo_c: 1e-4,
            min_step: 1e-12,
            damping: 1e-12,
        }
    }
}

/// Result of a bounded minimization.
#[derive(Debug, Clone)]
pub struct MinimizerResult {
    /// Final point, always inside the box.
    pub point: DVec,
    /// Final objective value.
    pub objective: Real,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the relative-decrease criterion was met.
    pub converged: bool,
    /// Objective value after every accepted step, starting with the initial one.
    pub objective_history: Vec<Real>,
}

fn objective(r: &DVec) -> Real {
    r.norm_squared()
}

/// Minimize `‖r(p)‖²` over the box starting from `start` (projected first).
pub fn minimize_bounded<P: Residuals + ?Sized>(
    problem: &P,
    start: DVec,
    bounds: &Bounds,
    config: &MinimizerConfig,
) -> MinimizerResult {
    let mut x = start;
    bounds.project(&mut x);
    let mut r = problem.residuals(&x);
    let mut f = objective(&r);
    let mut history = vec![f];
    let mut converged = false;
    let mut iterations = 0;

    for iter in 1..=config.max_iter {
        iterations = iter;
        if !f.is_finite() {
            break;
        }
        if f == 0.0 {
            converged = true;
            break;
        }

        let jac = problem.jacobian(&x);
        let grad = jac.tr_mul(&r) * 2.0;

        // Minimum-norm Gauss-Newton direction, gradient descent as fallback.
        let mut normal = &jac * jac.transpose();
        for k in 0..normal.nrows() {
            normal[(k, k)] += config.damping;
        }
        let dir = match normal.lu().solve(&r) {
            Some(z) if z.iter().all(|v| v.is_finite()) => -(jac.tr_mul(&z)),
            _ => -&grad,
        };

        let mut step = 1.0;
        let mut accepted = None;
        while step >= config.min_step {
            let mut trial = &x + &dir * step;
            bounds.project(&mut trial);
            let trial_r = problem.residuals(&trial);
            let trial_f = objective(&trial_r);
            let decrease = grad.dot(&(&trial - &x)).min(0.0);
            if trial_f.is_finite() && trial_f <= f + config.armijo_c * decrease {
                accepted = Some((trial, trial_r, trial_f));
                break;
            }
            step *= config.shrink;
        }

        // No descent possible; accept only a numerically vanishing objective.
        let Some((trial, trial_r, trial_f)) = accepted else {
            converged = f <= config.ftol;
            break;
        };

        let f_prev = f;
        x = trial;
        r = trial_r;
        f = trial_f;
        history.push(f);

        if f_prev - f <= config.ftol * f_prev.abs().max(f.abs()).max(1.0) {
            converged = true;
            break;
        }
    }

    MinimizerResult {
        point: x,
        objective: f,
        iterations,
        converged,
        objective_history: history,
    }
}
