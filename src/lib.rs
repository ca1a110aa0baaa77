//! Exact synthesis and optimization of Clifford circuits.
//!
//! A target stabilizer tableau is compiled into a circuit over H, S and
//! CX-type gates that is *provably* minimal for a chosen cost metric
//! (total gates, depth, or two-qubit gates). Candidate circuits of
//! bounded length are encoded as boolean constraints over the tableau's
//! mod-2 linear structure and handed to z3, either as a series of
//! feasibility queries (bound search) or as one optimizing query.

pub mod architecture;
pub mod circuit;
pub mod config;
pub mod encoding;
pub mod error;
pub mod pauli;
pub mod solver;
pub mod synthesis;
pub mod tableau;

pub use architecture::GateVocabulary;
pub use circuit::{Circuit, GateOp, SingleQubitGate};
pub use config::{SynthesisConfig, TargetMetric};
pub use error::{Result, SynthesisError};
pub use pauli::PauliString;
pub use synthesis::{CliffordSynthesizer, SynthesisResult};
pub use tableau::Tableau;

/// Synthesizes a provably metric-minimal circuit realizing `target`
/// starting from the identity tableau.
pub fn synthesize(target: &Tableau, config: &SynthesisConfig) -> Result<SynthesisResult> {
    let initial = Tableau::identity(target.num_qubits());
    synthesize_from(&initial, target, config)
}

/// Synthesizes a provably metric-minimal circuit mapping `initial` to
/// `target`. All configuration and tableau validation happens before any
/// solver work starts.
pub fn synthesize_from(
    initial: &Tableau,
    target: &Tableau,
    config: &SynthesisConfig,
) -> Result<SynthesisResult> {
    let vocab = prepare(initial, target, config)?;
    CliffordSynthesizer::new(initial, target, &vocab, config).run()
}

/// Finds a cheaper circuit implementing the same Clifford operator as
/// `circuit`, over the circuit's original qubit labels. The input serves
/// as the initial feasible witness, so the result never regresses its
/// metrics.
pub fn optimize(circuit: &Circuit, config: &SynthesisConfig) -> Result<SynthesisResult> {
    let initial = Tableau::identity(circuit.num_qubits());
    let target = Tableau::from_circuit(circuit);
    let vocab = prepare(&initial, &target, config)?;
    CliffordSynthesizer::new(&initial, &target, &vocab, config)
        .with_start_circuit(circuit)
        .run()
}

fn prepare(
    initial: &Tableau,
    target: &Tableau,
    config: &SynthesisConfig,
) -> Result<GateVocabulary> {
    config.validate()?;

    if initial.num_qubits() != target.num_qubits() {
        return Err(SynthesisError::configuration(format!(
            "initial tableau has {} qubits, target has {}",
            initial.num_qubits(),
            target.num_qubits()
        )));
    }
    if initial.is_state() && !target.is_state() {
        return Err(SynthesisError::configuration(
            "cannot synthesize a full Clifford operator from a state-shaped start",
        ));
    }
    if initial.rows().len() > 64 {
        return Err(SynthesisError::configuration(
            "tracked tableau rows exceed the 64-bit encoding limit",
        ));
    }

    let n = initial.num_qubits();
    match &config.coupling {
        Some(edges) => GateVocabulary::with_coupling(n, edges),
        None => Ok(GateVocabulary::full(n)),
    }
}
