// End-to-end solver behavior.

use std::collections::HashMap;
use std::time::Duration;

use quench::{Error, Interaction, Kernel, SolverConfig, System, solve};

fn quadratic_well() -> (Interaction<&'static str>, HashMap<&'static str, (i64, i64)>) {
    let mut interaction = Interaction::new();
    interaction.set(&["x", "y"], -3.0);
    interaction.set(&["x", "x"], 2.0);
    interaction.set(&["y", "y"], 2.0);
    interaction.set(&["x"], -4.0);
    interaction.set(&["y"], 5.0);
    let ranges = HashMap::from([("x", (-2, 3)), ("y", (0, 4))]);
    (interaction, ranges)
}

#[test]
fn heat_bath_finds_the_ground_state() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (interaction, ranges) = quadratic_well();
    let config = SolverConfig {
        num_sweeps: 50,
        num_samples: 10,
        state_updater: "HEAT_BATH".to_owned(),
        seed: Some(0),
        ..Default::default()
    };

    let results = solve(&interaction, &ranges, &config).unwrap();
    assert_eq!(results.len(), 10);
    assert!(results.durations.iter().sum::<Duration>() > Duration::ZERO);

    let best = results.min_energy_solutions();
    assert!(!best.is_empty());
    for i in 0..best.len() {
        assert_eq!(best.solutions[i]["x"], 1);
        assert_eq!(best.solutions[i]["y"], 0);
        assert_eq!(best.energies[i], -2.0);
        assert_eq!(best.metadata[i].num_sweeps, 50);
        assert_eq!(best.metadata[i].state_updater, "HEAT_BATH");
        assert!(best.metadata[i].seed.is_some());
        assert!(best.metadata[i].t_min > 0.0);
        assert!(best.metadata[i].t_max > best.metadata[i].t_min);
    }
}

#[test]
fn seeded_solves_are_reproducible() {
    let (interaction, ranges) = quadratic_well();
    for name in ["METROPOLIS", "HEAT_BATH", "SUWA-TODO"] {
        let config = SolverConfig {
            num_sweeps: 30,
            num_samples: 3,
            state_updater: name.to_owned(),
            seed: Some(7),
            ..Default::default()
        };
        let first = solve(&interaction, &ranges, &config).unwrap();
        let second = solve(&interaction, &ranges, &config).unwrap();
        assert_eq!(first.solutions, second.solutions, "{name}");
        assert_eq!(first.energies, second.energies, "{name}");
        assert_eq!(first.metadata, second.metadata, "{name}");
    }
}

#[test]
fn samples_advance_the_base_seed() {
    let (interaction, ranges) = quadratic_well();
    let config = SolverConfig {
        num_sweeps: 5,
        num_samples: 3,
        seed: Some(10),
        ..Default::default()
    };
    let results = solve(&interaction, &ranges, &config).unwrap();
    let seeds: Vec<_> = results.metadata.iter().map(|meta| meta.seed).collect();
    assert_eq!(seeds, vec![Some(10), Some(11), Some(12)]);
}

#[test]
fn unknown_updater_is_rejected() {
    let (interaction, ranges) = quadratic_well();
    let config = SolverConfig { state_updater: "GLAUBER".to_owned(), ..Default::default() };
    assert_eq!(
        solve(&interaction, &ranges, &config).unwrap_err(),
        Error::UnknownKernel("GLAUBER".to_owned()),
    );
}

#[test]
fn flat_problems_need_explicit_bounds() {
    let mut interaction = Interaction::new();
    interaction.set(&["x"], 0.0);
    let ranges = HashMap::from([("x", (0, 1))]);

    let config = SolverConfig { num_sweeps: 5, seed: Some(0), ..Default::default() };
    assert_eq!(solve(&interaction, &ranges, &config).unwrap_err(), Error::TrivialProblem);

    // Supplying both bounds bypasses estimation entirely.
    let config = SolverConfig {
        num_sweeps: 5,
        t_min: Some(0.1),
        t_max: Some(1.0),
        seed: Some(0),
        ..Default::default()
    };
    let results = solve(&interaction, &ranges, &config).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.energies[0], 0.0);
    assert_eq!(results.metadata[0].t_min, 0.1);
    assert_eq!(results.metadata[0].t_max, 1.0);
}

#[test]
fn inverted_range_is_rejected() {
    let mut interaction = Interaction::new();
    interaction.set(&["x"], 1.0);
    let ranges = HashMap::from([("x", (1, 0))]);
    assert_eq!(
        solve(&interaction, &ranges, &SolverConfig::default()).unwrap_err(),
        Error::InvalidDomain { lower: 1, upper: 0 },
    );
}

#[test]
fn heat_bath_samples_the_boltzmann_distribution() {
    // One site, E(v) = v² − v on [0, 2]: energies 0, 0, 2. At T = 1
    // the target distribution is ∝ (1, 1, e⁻²).
    let mut interaction = Interaction::new();
    interaction.set(&["v", "v"], 1.0);
    interaction.set(&["v"], -1.0);
    let ranges = HashMap::from([("v", (0, 2))]);
    let mut system = System::new(&interaction, &ranges, Some(3)).unwrap();
    let mut kernel = Kernel::from_name("HEAT_BATH", system.max_num_states()).unwrap();

    let draws = 20_000;
    let mut counts = [0usize; 3];
    for _ in 0..draws {
        let next = kernel.propose(&mut system, 0, 1.0);
        system.set_value(0, next);
        counts[next as usize] += 1;
    }

    let z = 2.0 + (-2.0f64).exp();
    let expected = [1.0 / z, 1.0 / z, (-2.0f64).exp() / z];
    for state in 0..3 {
        let freq = counts[state] as f64 / draws as f64;
        assert!(
            (freq - expected[state]).abs() < 0.02,
            "state {state}: frequency {freq}, target {}",
            expected[state]
        );
    }
}
