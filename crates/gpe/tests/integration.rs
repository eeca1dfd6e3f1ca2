//! End-to-end tests of the gpe engine.

use approx::assert_relative_eq;
use gpe::{
    DVec, GpeError, InitialCondition, LatticeError, LatticeShape, Real, Seeds, ShellFault, Simulation,
    SimulationConfig,
    gpe_observables::{particle_number_xy, trajectory_distance},
};

/// 4-site ring, J = 1, β = 0.01, 100 particles per site, dt = 1e-3.
fn chain_config(n_steps: usize) -> SimulationConfig {
    SimulationConfig::new(LatticeShape::chain(4))
        .coupling(1.0)
        .nonlinearity(0.01)
        .particles_per_site(100.0)
        .step(1e-3)
        .n_steps(n_steps)
}

fn column(m: &gpe::DMat, t: usize) -> DVec {
    m.column(t).clone_owned()
}

#[test]
fn uniform_state_rotates_rigidly() {
    let n_steps = 2000;
    let mut sim = Simulation::new(chain_config(n_steps)).unwrap();
    sim.generate_initial_state(InitialCondition::ZeroPhase, 78, -150.0);
    let counts = sim.run_dynamics();
    sim.set_constants_of_motion();

    assert_eq!(counts.polar, n_steps - 1);
    assert_eq!(counts.cartesian, 0);

    // dθ/dt = −βρ² + J·Σ_nn ρ_j/ρ_i = −1 + 2 on every site.
    let dt = 1e-3;
    for t in [0, 1, 500, n_steps - 1] {
        for i in 0..4 {
            assert_relative_eq!(sim.rho()[(i, t)], 10.0, epsilon = 1e-9);
            assert_relative_eq!(sim.theta()[(i, t)], t as Real * dt, epsilon = 1e-9);
        }
    }

    let series = sim.conserved();
    assert_eq!(series.len(), n_steps);
    assert_relative_eq!(series.energy[0], -600.0, epsilon = 1e-9);
    assert_relative_eq!(series.energy[n_steps - 1], -600.0, epsilon = 1e-6);
    assert_relative_eq!(series.particle_number[n_steps - 1], 400.0, epsilon = 1e-6);
    assert!(series.angular_momentum.iter().all(|l| l.abs() < 1e-9));
}

#[test]
fn energy_components_of_uniform_state() {
    let mut sim = Simulation::new(chain_config(2)).unwrap();
    sim.generate_initial_state(InitialCondition::ZeroPhase, 0, 0.0);
    let s = sim.initial_state();

    let parts = sim.energy_components(&s.x, &s.y);
    assert_relative_eq!(parts.kinetic, -800.0, epsilon = 1e-9);
    assert_relative_eq!(parts.potential, 200.0, epsilon = 1e-9);
    assert_relative_eq!(parts.disorder, 0.0);
    assert_relative_eq!(sim.energy_xy(&s.x, &s.y), -600.0, epsilon = 1e-9);
    assert_relative_eq!(sim.angular_momentum(&s.x, &s.y), 0.0, epsilon = 1e-9);
}

#[test]
fn clean_random_phase_energy_matches_direct_sum() {
    let n_steps = 500;
    let config = chain_config(n_steps).disorder_width(0.0);
    let mut sim = Simulation::new(config).unwrap();
    sim.generate_initial_state(InitialCondition::RandomPhase, 78, 0.0);
    sim.run_dynamics();
    sim.set_constants_of_motion();
    assert!(sim.hamiltonian().disorder.values().iter().all(|e| *e == 0.0));

    let (j, beta) = (1.0, 0.01);
    let rho = column(sim.rho(), 0);
    let theta = column(sim.theta(), 0);
    let mut expected: Real = 0.0;
    for i in 0..4 {
        expected += beta / 2.0 * rho[i].powi(4);
        for &k in sim.lattice().neighbors(i) {
            expected -= j * rho[i] * rho[k] * (theta[k] - theta[i]).cos();
        }
    }

    let series = sim.conserved();
    assert_relative_eq!(series.energy[0], expected, epsilon = 1e-9);
    assert_relative_eq!(series.particle_number[0], 400.0, max_relative = 1e-10);
    assert_relative_eq!(series.energy[n_steps - 1], expected, epsilon = 1e-5);
    assert_relative_eq!(series.particle_number[n_steps - 1], 400.0, max_relative = 1e-6);
}

#[test]
fn random_phase_run_conserves_energy_and_particles() {
    let n_steps = 2000;
    let config = chain_config(n_steps).disorder_width(0.5);
    let mut sim = Simulation::new(config).unwrap();
    sim.generate_initial_state(InitialCondition::RandomPhase, 78, 0.0);
    sim.run_dynamics();
    sim.set_constants_of_motion();

    let series = sim.conserved();
    let e0 = series.energy[0];
    for t in 0..n_steps {
        assert!(
            (series.energy[t] - e0).abs() < 1e-5,
            "energy drift {:.3e} at step {t}",
            series.energy[t] - e0
        );
        assert_relative_eq!(series.particle_number[t], 400.0, max_relative = 1e-6);
    }

    let drift = sim.conservation_drift();
    assert_eq!(drift.len(), n_steps);
    assert!(drift.iter().all(|m| m.particle_number_error < 1e-6));

    // Both representations describe the same state at every step.
    for t in [1, n_steps / 2, n_steps - 1] {
        for i in 0..4 {
            let (r, th) = (sim.rho()[(i, t)], sim.theta()[(i, t)]);
            assert_relative_eq!(sim.x()[(i, t)], r * th.cos(), epsilon = 1e-9);
            assert_relative_eq!(sim.y()[(i, t)], r * th.sin(), epsilon = 1e-9);
        }
    }
}

#[test]
fn zero_coupling_keeps_amplitudes() {
    let config = chain_config(500).coupling(0.0).tau_char(1.0).disorder_width(1.0);
    let mut sim = Simulation::new(config).unwrap();
    sim.generate_initial_state(InitialCondition::RandomPhase, 5, 0.0);
    sim.run_dynamics();

    let rho0 = column(sim.rho(), 0);
    for t in 1..500 {
        assert_eq!(column(sim.rho(), t), rho0);
    }
}

#[test]
fn small_amplitudes_use_cartesian_form() {
    let n_steps = 1000;
    let config = chain_config(n_steps).particles_per_site(0.25);
    let mut sim = Simulation::new(config).unwrap();

    let x = DVec::from_vec(vec![0.0, 0.5, -0.3, 0.2]);
    let y = DVec::from_vec(vec![0.0, 0.1, 0.4, -0.2]);
    sim.set_initial_xy(&x, &y).unwrap();
    let counts = sim.run_dynamics();

    assert_eq!(counts.cartesian, n_steps - 1);
    assert_eq!(counts.polar, 0);
    assert!(sim.x().iter().all(|v| v.is_finite()));
    assert!(sim.theta().iter().all(|v| v.is_finite()));

    let n0 = particle_number_xy(&x, &y);
    let n_end = particle_number_xy(&column(sim.x(), n_steps - 1), &column(sim.y(), n_steps - 1));
    assert_relative_eq!(n_end, n0, max_relative = 1e-8);
}

#[test]
fn switching_preserves_particle_number() {
    let n_steps = 2000;
    let mut sim = Simulation::new(chain_config(n_steps)).unwrap();

    // An empty site next to full ones forces Cartesian steps first.
    let x = DVec::from_vec(vec![0.0, 10.0, 10.0, 10.0]);
    let y = DVec::zeros(4);
    sim.set_initial_xy(&x, &y).unwrap();
    let counts = sim.run_dynamics();

    assert!(counts.cartesian > 0);
    assert_eq!(counts.total(), n_steps - 1);
    let n_end = particle_number_xy(&column(sim.x(), n_steps - 1), &column(sim.y(), n_steps - 1));
    assert_relative_eq!(n_end, 300.0, max_relative = 1e-6);
}

#[test]
fn higher_dimensional_lattices() {
    for shape in [LatticeShape::square(3, 3), LatticeShape::cubic(3, 3, 3)] {
        let config = SimulationConfig::new(shape)
            .particles_per_site(100.0)
            .step(1e-3)
            .n_steps(200);
        let mut sim = Simulation::new(config).unwrap();
        assert_eq!(sim.lattice().coordination(), 2 * sim.lattice().dimensionality());

        sim.generate_initial_state(InitialCondition::antiferromagnetic(), 78, 0.0);
        // Odd extents frustrate the alternating pattern, so low-amplitude
        // sites may take Cartesian steps.
        let counts = sim.run_dynamics();
        assert_eq!(counts.total(), 199);

        let total = 100.0 * shape.n_sites() as Real;
        let s = sim.state_at(199);
        assert_relative_eq!(s.particle_number(), total, max_relative = 1e-8);
        assert!(sim.particle_number_residual(&s.x, &s.y).abs() < 1e-6 * total);
    }
}

#[test]
fn disorder_is_deterministic() {
    let config = chain_config(2).disorder_width(2.0);
    let a = Simulation::new(config.clone()).unwrap();
    let mut b = Simulation::new(config).unwrap();
    let original = b.hamiltonian().disorder.clone();
    assert_eq!(a.hamiltonian().disorder, original);
    assert!(original.values().iter().all(|e| e.abs() <= 2.0));

    b.regenerate_disorder(79);
    assert_ne!(b.hamiltonian().disorder, original);
    b.regenerate_disorder(78);
    assert_eq!(b.hamiltonian().disorder, original);
}

#[test]
fn exact_reversal_retraces_trajectory() {
    let n_steps = 1000;
    let config = chain_config(n_steps).disorder_width(0.3);
    let mut sim = Simulation::new(config).unwrap();
    sim.generate_initial_state(InitialCondition::RandomPhase, 11, 0.0);
    let start = sim.initial_state();
    sim.run_dynamics();
    let end = sim.state_at(n_steps - 1);

    sim.reverse_hamiltonian(0.0, 0.0, 0.0);
    assert_relative_eq!(sim.hamiltonian().coupling, -1.0);
    assert_relative_eq!(sim.hamiltonian().nonlinearity, -0.01);

    sim.set_initial_xy(&end.x, &end.y).unwrap();
    sim.run_dynamics();
    let back = sim.state_at(n_steps - 1);
    let distance = trajectory_distance(&start.x, &start.y, &back.x, &back.y);
    assert!(distance < 1e-6, "reversal error {distance:.3e}");
}

#[test]
fn derived_series_and_histograms() {
    let n_steps = 300;
    let mut sim = Simulation::new(chain_config(n_steps)).unwrap();
    sim.generate_initial_state(InitialCondition::RandomPhase, 78, 0.0);
    sim.run_dynamics();
    sim.set_constants_of_motion();

    let loc = sim.localization();
    assert_eq!(loc.participation_rate.len(), n_steps);
    assert_relative_eq!(loc.participation_rate[0], 0.25, epsilon = 1e-12);
    assert_relative_eq!(loc.effective_nonlinearity[0], 0.01 * 0.25 / 4.0, epsilon = 1e-12);

    let hist = sim.histograms();
    assert_eq!(hist.xy.len(), 4);
    assert_eq!(hist.density.len(), 4);
    assert_eq!(hist.xy[2].total(), n_steps as u64);
    assert_eq!(hist.density[0].bins(), 100);

    let recomputed = sim.constants_of_motion(sim.rho(), sim.theta(), sim.x(), sim.y());
    assert_eq!(&recomputed, sim.conserved());
}

#[test]
fn constrained_perturbation_finds_shell() {
    let mut successes = 0;
    for seed in 0..10 {
        let seeds = Seeds {
            perturbation: seed,
            ..Seeds::default()
        };
        let mut sim = Simulation::new(chain_config(2).seeds(seeds)).unwrap();
        sim.generate_initial_state(InitialCondition::RandomPhase, 78, 0.0);
        let s = sim.initial_state();
        let e0 = sim.energy_xy(&s.x, &s.y);
        sim.set_energy_calibration(e0);

        let out = sim.constrained_perturbation(&s.x, &s.y, 0.5).unwrap();
        if out.status_code() == 0 {
            successes += 1;
            assert!(!sim.fault_log().is_tripped());
            let e1 = sim.energy_xy(&out.x, &out.y);
            assert!(((e1 - e0) / e0).abs() <= 1e-2);
            assert!(sim.particle_number_residual(&out.x, &out.y).abs() <= 4.0);
        }
    }
    assert!(successes >= 9, "only {successes}/10 perturbations succeeded");
}

#[test]
fn unsolvable_perturbation_trips_fault_log() {
    let mut sim = Simulation::new(chain_config(2)).unwrap();
    sim.generate_initial_state(InitialCondition::RandomPhase, 78, 0.0);
    let s = sim.initial_state();
    let e0 = sim.energy_xy(&s.x, &s.y);
    sim.set_energy_calibration(e0 + 1000.0);

    let out = sim.constrained_perturbation(&s.x, &s.y, 0.0).unwrap();
    assert_eq!(out.status_code(), 1);
    assert_eq!(out.retries, 10);
    assert!(matches!(out.faults[0], ShellFault::OffShell { .. }));

    let log = sim.fault_log();
    assert!(log.is_tripped());
    assert_eq!(log.checksum(), 1);
    assert!(!log.message().is_empty());

    // The log stays tripped after a later success.
    sim.set_energy_calibration(e0);
    let ok = sim.constrained_perturbation(&s.x, &s.y, 0.5).unwrap();
    if ok.is_success() {
        assert!(sim.fault_log().is_tripped());
    }
    sim.fault_log_mut().clear();
    assert!(!sim.fault_log().is_tripped());
}

#[test]
fn tiny_perturbation_has_exact_length() {
    let mut sim = Simulation::new(chain_config(2)).unwrap();
    sim.generate_initial_state(InitialCondition::RandomPhase, 78, 0.0);
    let s = sim.initial_state();

    let (x1, y1) = sim.tiny_perturbation(&s.x, &s.y).unwrap();
    assert_relative_eq!(trajectory_distance(&s.x, &s.y, &x1, &y1), 1e-8, max_relative = 1e-5);

    // Successive calls draw from the same advancing stream.
    let (x2, _) = sim.tiny_perturbation(&s.x, &s.y).unwrap();
    assert_ne!(x1, x2);
}

#[test]
fn invalid_configurations_are_rejected() {
    let zero = SimulationConfig::new(LatticeShape::new(4, 0, 1)).n_steps(2);
    assert!(matches!(
        Simulation::new(zero),
        Err(GpeError::Lattice(LatticeError::ZeroExtent { axis: 'y' }))
    ));

    let four_d = chain_config(2).dimensionality(4);
    assert!(matches!(
        Simulation::new(four_d),
        Err(GpeError::Lattice(LatticeError::UnsupportedDimensionality(4)))
    ));

    let no_coupling = chain_config(2).coupling(0.0);
    assert!(matches!(
        Simulation::new(no_coupling),
        Err(GpeError::InvalidParameter(_))
    ));

    let bad_step = chain_config(2).step(-1.0);
    assert!(Simulation::new(bad_step).is_err());
}

#[test]
fn config_serde_roundtrip() {
    let config = chain_config(10).disorder_width(0.7).threshold_xy_to_polar(0.5);
    let json = serde_json::to_string(&config).unwrap();
    let back: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.shape, config.shape);
    assert_eq!(back.n_steps, Some(10));
    assert_eq!(back.tau_char, None);
    assert_relative_eq!(back.disorder_width, 0.7);
    assert_relative_eq!(back.step, 1e-3);
    assert_relative_eq!(back.threshold_xy_to_polar.unwrap(), 0.5);

    let partial: SimulationConfig = serde_json::from_str(r#"{"coupling": 2.0}"#).unwrap();
    assert_relative_eq!(partial.coupling, 2.0);
    assert_eq!(partial.seeds, Seeds::default());
    assert_eq!(partial.shape, LatticeShape::chain(10));
}
