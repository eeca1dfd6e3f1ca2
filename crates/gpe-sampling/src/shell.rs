//! Perturbations that stay on a fixed energy and particle-number shell.
//!
//! The solver minimizes the squared relative residuals of energy and particle
//! number inside a box around the reference state. A failed attempt is
//! retried from a freshly perturbed guess in a wider box, at most
//! `max_retries` times. Failures never abort: the best point found is
//! returned together with the faults that describe what went wrong.

use gpe_dynamics::Hamiltonian;
use gpe_math::{DMat, DVec, Real};
use gpe_observables::{energy_gradient_xy, energy_xy, particle_number_xy, trajectory_distance};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

use crate::fault::ShellFault;
use crate::minimize::{Bounds, MinimizerConfig, Residuals, minimize_bounded};

/// Energy and particle number the perturbed state must reproduce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellTarget {
    pub energy: Real,
    pub particle_number: Real,
}

impl ShellTarget {
    fn energy_scale(&self) -> Real {
        if self.energy == 0.0 { 1.0 } else { self.energy.abs() }
    }

    fn particle_scale(&self) -> Real {
        if self.particle_number == 0.0 {
            1.0
        } else {
            self.particle_number.abs()
        }
    }
}

/// Solver tolerances and retry policy.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Maximum relative energy residual of an accepted state.
    pub energy_tolerance: Real,
    /// Maximum relative particle-number residual of an accepted state.
    pub particle_tolerance: Real,
    pub max_retries: usize,
    /// Box half-width multiplier used by the retries.
    pub widening: Real,
    /// Standard deviation of the noise added to the first guess on retry.
    pub retry_noise: Real,
    pub minimizer: MinimizerConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            energy_tolerance: 1e-2,
            particle_tolerance: 1e-2,
            max_retries: 10,
            widening: 10.0,
            retry_noise: 1.0,
            minimizer: MinimizerConfig::default(),
        }
    }
}

/// Result of one constrained perturbation.
#[derive(Debug, Clone)]
pub struct ShellOutcome {
    pub x: DVec,
    pub y: DVec,
    /// Retries performed after the first attempt.
    pub retries: usize,
    /// Empty on success.
    pub faults: Vec<ShellFault>,
    /// Relative energy residual of the returned state.
    pub energy_residual: Real,
    /// Relative particle-number residual of the returned state.
    pub particle_residual: Real,
    /// Whether the minimizer converged on the returned state.
    pub converged: bool,
}

impl ShellOutcome {
    /// 0 on success, 1 on failure.
    pub fn status_code(&self) -> u8 {
        u8::from(!self.faults.is_empty())
    }

    pub fn is_success(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Residuals `[(E − E_t)/|E_t|, (N − N_t)/|N_t|]` over the stacked `[x; y]`.
struct ShellProblem<'a> {
    hamiltonian: &'a Hamiltonian,
    target: ShellTarget,
}

impl ShellProblem<'_> {
    fn split(&self, p: &DVec) -> (DVec, DVec) {
        gpe_math::split(p, self.hamiltonian.n_sites())
    }

    /// Signed relative residuals of a Cartesian state.
    fn relative(&self, x: &DVec, y: &DVec) -> (Real, Real) {
        let e = (energy_xy(self.hamiltonian, x, y) - self.target.energy) / self.target.energy_scale();
        let n = (particle_number_xy(x, y) - self.target.particle_number) / self.target.particle_scale();
        (e, n)
    }
}

impl Residuals for ShellProblem<'_> {
    fn residuals(&self, p: &DVec) -> DVec {
        let (x, y) = self.split(p);
        let (e, n) = self.relative(&x, &y);
        DVec::from_vec(vec![e, n])
    }

    fn jacobian(&self, p: &DVec) -> DMat {
        let n_sites = self.hamiltonian.n_sites();
        let (x, y) = self.split(p);
        let (gx, gy) = energy_gradient_xy(self.hamiltonian, &x, &y);
        let e_scale = self.target.energy_scale();
        let n_scale = self.target.particle_scale();

        let mut jac = DMat::zeros(2, 2 * n_sites);
        for i in 0..n_sites {
            jac[(0, i)] = gx[i] / e_scale;
            jac[(0, n_sites + i)] = gy[i] / e_scale;
            jac[(1, i)] = 2.0 * x[i] / n_scale;
            jac[(1, n_sites + i)] = 2.0 * y[i] / n_scale;
        }
        jac
    }
}

struct Attempt {
    point: DVec,
    objective: Real,
    converged: bool,
    energy_residual: Real,
    particle_residual: Real,
}

/// Constrained perturbation solver for one Hamiltonian.
#[derive(Debug, Clone)]
pub struct ShellSolver<'a> {
    hamiltonian: &'a Hamiltonian,
    config: ShellConfig,
}

impl<'a> ShellSolver<'a> {
    pub fn new(hamiltonian: &'a Hamiltonian, config: ShellConfig) -> Self {
        Self { hamiltonian, config }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    fn accepts(&self, attempt: &Attempt) -> bool {
        attempt.converged
            && attempt.energy_residual <= self.config.energy_tolerance
            && attempt.particle_residual <= self.config.particle_tolerance
    }

    fn attempt(&self, problem: &ShellProblem<'_>, start: DVec, bounds: &Bounds) -> Attempt {
        let result = minimize_bounded(problem, start, bounds, &self.config.minimizer);
        let (x, y) = problem.split(&result.point);
        let (e, n) = problem.relative(&x, &y);
        Attempt {
            point: result.point,
            objective: result.objective,
            converged: result.converged,
            energy_residual: e.abs(),
            particle_residual: n.abs(),
        }
    }

    /// Find a state within `delta` of `(x0, y0)` per coordinate (widened on
    /// retries) whose energy and particle number match `target`.
    pub fn perturb<R: Rng + ?Sized>(
        &self,
        x0: &DVec,
        y0: &DVec,
        delta: Real,
        target: ShellTarget,
        rng: &mut R,
    ) -> ShellOutcome {
        let problem = ShellProblem {
            hamiltonian: self.hamiltonian,
            target,
        };
        let center = gpe_math::stack(x0, y0);
        let dim = 2 * self.hamiltonian.n_sites();

        let scale = delta / self.hamiltonian.lattice.dimensionality() as Real;
        let guess = center.map(|c| c + scale * rng.sample::<Real, _>(StandardNormal));

        let bounds = Bounds::around(&center, delta);
        let mut best = self.attempt(&problem, guess.clone(), &bounds);
        let mut accepted = self.accepts(&best);
        debug!(
            attempt = 0,
            objective = best.objective,
            energy_residual = best.energy_residual,
            particle_residual = best.particle_residual,
            "shell attempt"
        );

        let wide = Bounds::around(&center, self.config.widening * delta);
        let mut retries = 0;
        while !accepted && retries < self.config.max_retries {
            retries += 1;
            let start = DVec::from_fn(dim, |i, _| {
                guess[i] + self.config.retry_noise * rng.sample::<Real, _>(StandardNormal)
            });
            let attempt = self.attempt(&problem, start, &wide);
            debug!(
                attempt = retries,
                objective = attempt.objective,
                energy_residual = attempt.energy_residual,
                particle_residual = attempt.particle_residual,
                "shell attempt"
            );

            accepted = self.accepts(&attempt);
            if accepted || attempt.objective < best.objective {
                best = attempt;
            }
        }

        let mut faults = Vec::new();
        if !accepted {
            if best.energy_residual > self.config.energy_tolerance {
                faults.push(ShellFault::OffShell {
                    residual: best.energy_residual,
                });
            }
            if best.particle_residual > self.config.particle_tolerance {
                faults.push(ShellFault::ParticleNumber {
                    residual: best.particle_residual,
                });
            }
            faults.push(ShellFault::AttemptsExhausted { attempts: retries });
            warn!(
                retries,
                energy_residual = best.energy_residual,
                particle_residual = best.particle_residual,
                "constrained perturbation failed"
            );
        }

        let (x, y) = problem.split(&best.point);
        ShellOutcome {
            x,
            y,
            retries,
            faults,
            energy_residual: best.energy_residual,
            particle_residual: best.particle_residual,
            converged: best.converged,
        }
    }
}

/// Displace `(x0, y0)` in a random direction by exactly `step` in the
/// Euclidean norm of [`trajectory_distance`].
pub fn tiny_perturbation<R: Rng + ?Sized>(x0: &DVec, y0: &DVec, step: Real, rng: &mut R) -> (DVec, DVec) {
    let x1 = x0.map(|v| v + 0.1 * rng.sample::<Real, _>(StandardNormal));
    let y1 = y0.map(|v| v + 0.1 * rng.sample::<Real, _>(StandardNormal));
    let dist = trajectory_distance(x0, y0, &x1, &y1);
    if dist == 0.0 {
        return (x0.clone(), y0.clone());
    }
    let factor = step / dist;
    (x0 + (x1 - x0) * factor, y0 + (y1 - y0) * factor)
}
