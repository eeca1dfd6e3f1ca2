//! The dynamics engine: trajectory storage, integration and derived series.

use gpe_dynamics::{Hamiltonian, SiteState, StepCounts, SwitchingIntegrator};
use gpe_lattice::{DisorderField, Lattice};
use gpe_math::{DMat, DVec, Real};
use gpe_observables::{
    ConservationMonitor, ConservationState, ConservedSeries, EnergyComponents, LocalizationSeries,
    SiteHistograms, histogram::DEFAULT_BINS,
};
use gpe_sampling::{
    FaultLog, InitialCondition, ShellConfig, ShellOutcome, ShellSolver, ShellTarget,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::{GpeError, Result};

/// A lattice simulation with pre-allocated `n_sites × n_steps` trajectories.
///
/// Column 0 of every trajectory matrix holds the initial condition; the
/// integrator fills columns `1..n_steps` from it. The polar (`rho`, `theta`)
/// and Cartesian (`x`, `y`) matrices always describe the same states.
pub struct Simulation {
    config: SimulationConfig,
    hamiltonian: Hamiltonian,
    integrator: SwitchingIntegrator,
    tau_char: Real,
    n_steps: usize,
    time_grid: Vec<Real>,

    rho: DMat,
    theta: DMat,
    x: DMat,
    y: DMat,

    disorder_rng: StdRng,
    trajectory_rng: StdRng,
    perturbation_rng: StdRng,

    energy_calibration: Real,
    conserved: ConservedSeries,
    localization: LocalizationSeries,
    histograms: SiteHistograms,
    fault_log: FaultLog,
}

impl Simulation {
    /// Validate the configuration, build the lattice and draw the disorder.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let lattice = Lattice::with_dimensionality(config.shape, config.dimensionality)?;
        let tau_char = config.resolve_tau_char()?;
        let n_steps = config.resolve_n_steps()?;
        let threshold = config.resolve_threshold(lattice.dimensionality());
        let n_sites = lattice.n_sites();

        let mut disorder_rng = StdRng::seed_from_u64(config.seeds.disorder);
        let disorder = DisorderField::generate(&lattice, config.disorder_width, &mut disorder_rng);

        info!(
            n_sites,
            dimensionality = lattice.dimensionality(),
            n_steps,
            tau_char,
            step = config.step,
            "built simulation"
        );

        let hamiltonian = Hamiltonian::new(lattice, config.coupling, config.nonlinearity, disorder);
        let span = config.time * tau_char;
        let time_grid = linspace(0.0, span, n_steps);

        Ok(Self {
            hamiltonian,
            integrator: SwitchingIntegrator::new(threshold),
            tau_char,
            n_steps,
            time_grid,
            rho: DMat::zeros(n_sites, n_steps),
            theta: DMat::zeros(n_sites, n_steps),
            x: DMat::zeros(n_sites, n_steps),
            y: DMat::zeros(n_sites, n_steps),
            disorder_rng,
            trajectory_rng: StdRng::seed_from_u64(config.seeds.trajectory),
            perturbation_rng: StdRng::seed_from_u64(config.seeds.perturbation),
            energy_calibration: config.energy_calibration,
            conserved: ConservedSeries::default(),
            localization: LocalizationSeries::default(),
            histograms: SiteHistograms::default(),
            fault_log: FaultLog::new(),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn hamiltonian(&self) -> &Hamiltonian {
        &self.hamiltonian
    }

    pub fn lattice(&self) -> &Lattice {
        &self.hamiltonian.lattice
    }

    pub fn n_sites(&self) -> usize {
        self.hamiltonian.n_sites()
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn tau_char(&self) -> Real {
        self.tau_char
    }

    /// Sample times `linspace(0, time·tau_char, n_steps)`.
    pub fn time_grid(&self) -> &[Real] {
        &self.time_grid
    }

    pub fn rho(&self) -> &DMat {
        &self.rho
    }

    pub fn theta(&self) -> &DMat {
        &self.theta
    }

    pub fn x(&self) -> &DMat {
        &self.x
    }

    pub fn y(&self) -> &DMat {
        &self.y
    }

    /// Total particle number `particles_per_site · n_sites`.
    pub fn total_particles(&self) -> Real {
        self.config.particles_per_site * self.n_sites() as Real
    }

    /// Target energy of constrained perturbations.
    pub fn energy_calibration(&self) -> Real {
        self.energy_calibration
    }

    pub fn set_energy_calibration(&mut self, energy: Real) {
        self.energy_calibration = energy;
    }

    /// Draw a new disorder realization from `seed`.
    pub fn regenerate_disorder(&mut self, seed: u64) {
        self.disorder_rng = StdRng::seed_from_u64(seed);
        self.hamiltonian.disorder = DisorderField::generate(
            &self.hamiltonian.lattice,
            self.config.disorder_width,
            &mut self.disorder_rng,
        );
    }

    /// Store a generated initial condition at time index 0 and set the
    /// calibration energy to `energy_per_site · n_sites`.
    pub fn generate_initial_state(&mut self, kind: InitialCondition, seed: u64, energy_per_site: Real) {
        self.trajectory_rng = StdRng::seed_from_u64(seed);
        let state = kind.build(
            &self.hamiltonian.lattice,
            self.config.particles_per_site,
            &mut self.trajectory_rng,
        );
        self.write_column(0, &state);
        self.energy_calibration = energy_per_site * self.n_sites() as Real;
    }

    /// Store a Cartesian initial condition at time index 0.
    pub fn set_initial_xy(&mut self, x: &DVec, y: &DVec) -> Result<()> {
        self.check_len(x)?;
        self.check_len(y)?;
        let state = SiteState::from_cartesian(x.clone(), y.clone());
        self.write_column(0, &state);
        Ok(())
    }

    pub fn initial_state(&self) -> SiteState {
        self.state_at(0)
    }

    /// State stored at time index `t`.
    pub fn state_at(&self, t: usize) -> SiteState {
        SiteState {
            rho: self.rho.column(t).clone_owned(),
            theta: self.theta.column(t).clone_owned(),
            x: self.x.column(t).clone_owned(),
            y: self.y.column(t).clone_owned(),
        }
    }

    /// Integrate from the state at index 0, overwriting indices `1..n_steps`.
    pub fn run_dynamics(&mut self) -> StepCounts {
        let mut counts = StepCounts::default();
        let mut prev = self.state_at(0);
        for t in 1..self.n_steps {
            let (next, repr) = self.integrator.advance(&self.hamiltonian, &prev, self.config.step);
            counts.record(repr);
            self.write_column(t, &next);
            prev = next;
        }
        info!(
            polar_steps = counts.polar,
            cartesian_steps = counts.cartesian,
            "dynamics finished"
        );
        counts
    }

    /// Constants of motion for arbitrary trajectory matrices.
    pub fn constants_of_motion(&self, rho: &DMat, theta: &DMat, x: &DMat, y: &DMat) -> ConservedSeries {
        ConservedSeries::from_trajectory(&self.hamiltonian, rho, theta, x, y)
    }

    /// Evaluate and store every derived series of the stored trajectory.
    pub fn set_constants_of_motion(&mut self) {
        self.conserved = self.constants_of_motion(&self.rho, &self.theta, &self.x, &self.y);
        self.localization = LocalizationSeries::from_trajectory(self.hamiltonian.nonlinearity, &self.rho);
        self.histograms = SiteHistograms::from_trajectory(&self.x, &self.y, &self.rho, DEFAULT_BINS);
    }

    pub fn conserved(&self) -> &ConservedSeries {
        &self.conserved
    }

    pub fn localization(&self) -> &LocalizationSeries {
        &self.localization
    }

    pub fn histograms(&self) -> &SiteHistograms {
        &self.histograms
    }

    /// Drift of energy and particle number at every stored time step
    /// relative to the initial state.
    pub fn conservation_drift(&self) -> Vec<ConservationMonitor> {
        let initial = self.initial_state();
        let baseline = ConservationState::new(&self.hamiltonian, &initial.x, &initial.y);
        (0..self.n_steps)
            .map(|t| {
                let x = self.x.column(t).clone_owned();
                let y = self.y.column(t).clone_owned();
                ConservationMonitor::check(&baseline, &self.hamiltonian, &x, &y)
            })
            .collect()
    }

    /// Negate J, β and the disorder with relative Gaussian errors.
    pub fn reverse_hamiltonian(&mut self, error_coupling: Real, error_nonlinearity: Real, error_disorder: Real) {
        self.hamiltonian.reverse(
            error_coupling,
            error_nonlinearity,
            error_disorder,
            &mut self.perturbation_rng,
        );
    }

    fn shell_config(&self) -> ShellConfig {
        let tol = &self.config.tolerances;
        let mut config = ShellConfig {
            energy_tolerance: tol.energy,
            particle_tolerance: tol.particle_number,
            ..ShellConfig::default()
        };
        config.minimizer.ftol = tol.ftol;
        config
    }

    /// Perturb `(x0, y0)` onto the shell of the calibration energy and the
    /// particle number of `(x0, y0)`.
    ///
    /// Solver failures are reported by the outcome and appended to the
    /// [`FaultLog`]; only malformed input is an `Err`.
    pub fn constrained_perturbation(&mut self, x0: &DVec, y0: &DVec, delta: Real) -> Result<ShellOutcome> {
        self.check_len(x0)?;
        self.check_len(y0)?;
        let target = ShellTarget {
            energy: self.energy_calibration,
            particle_number: gpe_observables::particle_number_xy(x0, y0),
        };
        let solver = ShellSolver::new(&self.hamiltonian, self.shell_config());
        let outcome = solver.perturb(x0, y0, delta, target, &mut self.perturbation_rng);
        for fault in &outcome.faults {
            self.fault_log.record(fault);
        }
        Ok(outcome)
    }

    /// Random displacement of `(x0, y0)` with length `tolerances.perturbation_step`.
    pub fn tiny_perturbation(&mut self, x0: &DVec, y0: &DVec) -> Result<(DVec, DVec)> {
        self.check_len(x0)?;
        self.check_len(y0)?;
        Ok(gpe_sampling::tiny_perturbation(
            x0,
            y0,
            self.config.tolerances.perturbation_step,
            &mut self.perturbation_rng,
        ))
    }

    pub fn energy_xy(&self, x: &DVec, y: &DVec) -> Real {
        gpe_observables::energy_xy(&self.hamiltonian, x, y)
    }

    pub fn energy_components(&self, x: &DVec, y: &DVec) -> EnergyComponents {
        gpe_observables::energy_components(&self.hamiltonian, x, y)
    }

    pub fn angular_momentum(&self, x: &DVec, y: &DVec) -> Real {
        gpe_observables::angular_momentum(&self.hamiltonian, x, y)
    }

    /// `Σ (x² + y²) − particles_per_site · n_sites`.
    pub fn particle_number_residual(&self, x: &DVec, y: &DVec) -> Real {
        gpe_observables::particle_number_xy(x, y) - self.total_particles()
    }

    /// Cross-call record of perturbation failures.
    pub fn fault_log(&self) -> &FaultLog {
        &self.fault_log
    }

    pub fn fault_log_mut(&mut self) -> &mut FaultLog {
        &mut self.fault_log
    }

    fn check_len(&self, v: &DVec) -> Result<()> {
        self.hamiltonian.lattice.check_len(v.len()).map_err(GpeError::from)
    }

    fn write_column(&mut self, t: usize, state: &SiteState) {
        self.rho.set_column(t, &state.rho);
        self.theta.set_column(t, &state.theta);
        self.x.set_column(t, &state.x);
        self.y.set_column(t, &state.y);
    }
}

fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let dt = (end - start) / (n - 1) as Real;
            (0..n).map(|i| start + dt * i as Real).collect()
        }
    }
}
