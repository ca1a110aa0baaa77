use std::time::Duration;

use cliffsynth::{
    optimize, synthesize, Circuit, GateOp, SingleQubitGate, SynthesisConfig, SynthesisError,
    SynthesisResult, Tableau, TargetMetric,
};

/// One synthesis scenario with its known optima, small enough that the
/// optima are checkable by hand.
struct Scenario {
    description: &'static str,
    target: &'static [&'static str],
    expected_minimal_gates: usize,
    expected_minimal_depth: usize,
    expected_minimal_gates_at_minimal_depth: usize,
    expected_minimal_two_qubit_gates: usize,
    expected_minimal_gates_at_minimal_two_qubit_gates: usize,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        description: "identity",
        target: &["Z"],
        expected_minimal_gates: 0,
        expected_minimal_depth: 0,
        expected_minimal_gates_at_minimal_depth: 0,
        expected_minimal_two_qubit_gates: 0,
        expected_minimal_gates_at_minimal_two_qubit_gates: 0,
    },
    Scenario {
        description: "plus state",
        target: &["X"],
        expected_minimal_gates: 1,
        expected_minimal_depth: 1,
        expected_minimal_gates_at_minimal_depth: 1,
        expected_minimal_two_qubit_gates: 0,
        expected_minimal_gates_at_minimal_two_qubit_gates: 1,
    },
    Scenario {
        description: "i state",
        target: &["Y"],
        expected_minimal_gates: 2,
        expected_minimal_depth: 2,
        expected_minimal_gates_at_minimal_depth: 2,
        expected_minimal_two_qubit_gates: 0,
        expected_minimal_gates_at_minimal_two_qubit_gates: 2,
    },
    Scenario {
        description: "bell state",
        target: &["XX", "ZZ"],
        expected_minimal_gates: 2,
        expected_minimal_depth: 2,
        expected_minimal_gates_at_minimal_depth: 2,
        expected_minimal_two_qubit_gates: 1,
        expected_minimal_gates_at_minimal_two_qubit_gates: 2,
    },
];

fn init_logging() {
    let _ = colog::default_builder()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

fn config_for(metric: TargetMetric, use_maxsat: bool) -> SynthesisConfig {
    SynthesisConfig {
        target_metric: metric,
        use_maxsat,
        ..SynthesisConfig::default()
    }
}

/// Every returned circuit must replay to the target from the identity.
fn assert_sound(target: &Tableau, result: &SynthesisResult) {
    let circuit = result.circuit.as_ref().expect("witness expected");
    let replayed = circuit
        .iter_gates()
        .fold(Tableau::identity(target.num_qubits()), |t, g| t.apply(g));
    assert!(
        replayed.satisfies(target),
        "result circuit does not implement the target:\n{circuit}"
    );
    assert!(!result.timeout);
    assert_eq!(result.gates, circuit.gates());
    assert_eq!(result.depth, circuit.depth());
    assert_eq!(result.two_qubit_gates, circuit.two_qubit_gates());
}

#[test]
fn minimal_gates_both_strategies() {
    init_logging();
    for scenario in SCENARIOS {
        let target = Tableau::from_generators(scenario.target).unwrap();
        for use_maxsat in [false, true] {
            let result = synthesize(&target, &config_for(TargetMetric::Gates, use_maxsat))
                .expect(scenario.description);
            assert_sound(&target, &result);
            assert_eq!(
                result.gates, scenario.expected_minimal_gates,
                "{} (maxsat: {use_maxsat})",
                scenario.description
            );
        }
    }
}

#[test]
fn minimal_depth_both_strategies() {
    init_logging();
    for scenario in SCENARIOS {
        let target = Tableau::from_generators(scenario.target).unwrap();
        for use_maxsat in [false, true] {
            let result = synthesize(&target, &config_for(TargetMetric::Depth, use_maxsat))
                .expect(scenario.description);
            assert_sound(&target, &result);
            assert_eq!(
                result.depth, scenario.expected_minimal_depth,
                "{} (maxsat: {use_maxsat})",
                scenario.description
            );
        }
    }
}

#[test]
fn minimal_gates_at_minimal_depth() {
    init_logging();
    for scenario in SCENARIOS {
        let target = Tableau::from_generators(scenario.target).unwrap();
        for use_maxsat in [false, true] {
            let config = SynthesisConfig {
                minimize_gates_after_depth_optimization: true,
                ..config_for(TargetMetric::Depth, use_maxsat)
            };
            let result = synthesize(&target, &config).expect(scenario.description);
            assert_sound(&target, &result);
            assert_eq!(result.depth, scenario.expected_minimal_depth);
            assert_eq!(
                result.gates, scenario.expected_minimal_gates_at_minimal_depth,
                "{} (maxsat: {use_maxsat})",
                scenario.description
            );
        }
    }
}

#[test]
fn minimal_two_qubit_gates() {
    init_logging();
    for scenario in SCENARIOS {
        let target = Tableau::from_generators(scenario.target).unwrap();
        for use_maxsat in [false, true] {
            let config = SynthesisConfig {
                try_higher_gate_limit_for_two_qubit_gate_optimization: true,
                ..config_for(TargetMetric::TwoQubitGates, use_maxsat)
            };
            let result = synthesize(&target, &config).expect(scenario.description);
            assert_sound(&target, &result);
            assert_eq!(
                result.two_qubit_gates, scenario.expected_minimal_two_qubit_gates,
                "{} (maxsat: {use_maxsat})",
                scenario.description
            );
        }
    }
}

#[test]
fn minimal_gates_at_minimal_two_qubit_gates() {
    init_logging();
    for scenario in SCENARIOS {
        let target = Tableau::from_generators(scenario.target).unwrap();
        for use_maxsat in [false, true] {
            let config = SynthesisConfig {
                try_higher_gate_limit_for_two_qubit_gate_optimization: true,
                minimize_gates_after_two_qubit_gate_optimization: true,
                ..config_for(TargetMetric::TwoQubitGates, use_maxsat)
            };
            let result = synthesize(&target, &config).expect(scenario.description);
            assert_sound(&target, &result);
            assert_eq!(
                result.two_qubit_gates,
                scenario.expected_minimal_two_qubit_gates
            );
            assert_eq!(
                result.gates, scenario.expected_minimal_gates_at_minimal_two_qubit_gates,
                "{} (maxsat: {use_maxsat})",
                scenario.description
            );
        }
    }
}

#[test]
fn optimizing_a_wasteful_bell_circuit() {
    init_logging();
    // h0 s0 sdg0 h0 h0 cx01: four redundant single-qubit gates.
    let wasteful = Circuit::from_gates(
        2,
        [
            GateOp::Single(SingleQubitGate::H, 0),
            GateOp::Single(SingleQubitGate::S, 0),
            GateOp::Single(SingleQubitGate::Sdg, 0),
            GateOp::Single(SingleQubitGate::H, 0),
            GateOp::Single(SingleQubitGate::H, 0),
            GateOp::Cx {
                control: 0,
                target: 1,
            },
        ],
    );
    let target = Tableau::from_circuit(&wasteful);

    let result = optimize(&wasteful, &config_for(TargetMetric::Gates, false)).unwrap();
    assert_sound(&target, &result);
    assert_eq!(result.gates, 2);

    // Re-optimizing the optimum never regresses it.
    let again = optimize(
        result.circuit.as_ref().unwrap(),
        &config_for(TargetMetric::Gates, false),
    )
    .unwrap();
    assert_eq!(again.gates, result.gates);
    assert_eq!(again.depth, result.depth);
}

#[test]
fn expired_budget_reports_timeout_not_error() {
    init_logging();
    let target = Tableau::from_generators(&["XX", "ZZ"]).unwrap();
    let config = SynthesisConfig {
        time_limit: Some(Duration::from_nanos(1)),
        ..config_for(TargetMetric::Gates, false)
    };
    let result = synthesize(&target, &config).unwrap();
    assert!(result.timeout);
    match &result.circuit {
        // Deadline expired before any witness existed.
        None => {
            assert_eq!(result.gates, 0);
            assert_eq!(result.depth, 0);
            assert_eq!(result.two_qubit_gates, 0);
        }
        // A witness found before expiry must still be sound.
        Some(circuit) => {
            let replayed = circuit
                .iter_gates()
                .fold(Tableau::identity(2), |t, g| t.apply(g));
            assert!(replayed.satisfies(&target));
        }
    }
}

#[test]
fn larger_budgets_never_worsen_the_optimum() {
    init_logging();
    let target = Tableau::from_generators(&["XX", "ZZ"]).unwrap();
    let baseline = synthesize(&target, &config_for(TargetMetric::Gates, false)).unwrap();
    assert_sound(&target, &baseline);
    assert_eq!(baseline.gates, 2);

    // A larger initial feasible bound widens the search space but never
    // the reported optimum.
    for initial_timestep_limit in [2, 4, 8] {
        let config = SynthesisConfig {
            initial_timestep_limit: Some(initial_timestep_limit),
            ..config_for(TargetMetric::Gates, false)
        };
        let result = synthesize(&target, &config).unwrap();
        assert_sound(&target, &result);
        assert_eq!(
            result.gates, baseline.gates,
            "initial timestep limit {initial_timestep_limit}"
        );
    }

    // Neither does a larger time budget.
    let generous = SynthesisConfig {
        time_limit: Some(Duration::from_secs(300)),
        ..config_for(TargetMetric::Gates, false)
    };
    let result = synthesize(&target, &generous).unwrap();
    assert_sound(&target, &result);
    assert_eq!(result.gates, baseline.gates);
}

#[test]
fn unknown_option_rejected_before_solving() {
    let err = SynthesisConfig::from_options([("invalid_kwarg", "true")]).unwrap_err();
    assert!(matches!(err, SynthesisError::Configuration(_)));
}

#[test]
fn disconnected_coupling_is_unsatisfiable() {
    init_logging();
    let target = Tableau::from_generators(&["XX", "ZZ"]).unwrap();
    let config = SynthesisConfig {
        coupling: Some(vec![]),
        ..config_for(TargetMetric::Gates, false)
    };
    let err = synthesize(&target, &config).unwrap_err();
    assert!(matches!(err, SynthesisError::Unsatisfiable(_)));
}

#[test]
fn line_coupling_still_reaches_the_target() {
    init_logging();
    // GHZ on a 0-1-2 line; the entanglers must follow the line.
    let target = Tableau::from_generators(&["XXX", "ZZI", "IZZ"]).unwrap();
    let config = SynthesisConfig {
        coupling: Some(vec![(0, 1), (1, 2)]),
        ..config_for(TargetMetric::Gates, false)
    };
    let result = synthesize(&target, &config).unwrap();
    assert_sound(&target, &result);
    assert_eq!(result.two_qubit_gates, 2);
    for gate in result.circuit.as_ref().unwrap().iter_gates() {
        if let GateOp::Cx { control, target } = gate {
            let edge = (*control.min(target), *control.max(target));
            assert!(edge == (0, 1) || edge == (1, 2), "illegal coupling {gate}");
        }
    }
}

#[test]
fn synthesis_from_a_non_identity_start() {
    init_logging();
    // |+> to |i> is a single S gate.
    let initial = Tableau::from_generators(&["X"]).unwrap();
    let target = Tableau::from_generators(&["Y"]).unwrap();
    let result =
        cliffsynth::synthesize_from(&initial, &target, &config_for(TargetMetric::Gates, false))
            .unwrap();
    let circuit = result.circuit.as_ref().unwrap();
    let replayed = circuit.iter_gates().fold(initial, |t, g| t.apply(g));
    assert!(replayed.satisfies(&target));
    assert_eq!(result.gates, 1);
}
