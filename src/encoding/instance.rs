use log::trace;
use z3::ast::{Bool, Int};

use crate::architecture::GateVocabulary;
use crate::circuit::Circuit;
use crate::config::TargetMetric;
use crate::encoding::{EncodedStep, StateVars};
use crate::solver::SolverAdapter;
use crate::tableau::Tableau;

/// One bounded-circuit instance: `timesteps` chained step encodings with
/// the first snapshot pinned to the initial tableau and the last to the
/// target. Metric side conditions are added separately so the same
/// structure serves bound search and direct optimization.
pub struct CircuitEncoding<'ctx> {
    z3: &'ctx z3::Context,
    num_qubits: usize,
    steps: Vec<EncodedStep<'ctx>>,
}

impl<'ctx> CircuitEncoding<'ctx> {
    pub fn build(
        z3: &'ctx z3::Context,
        initial: &Tableau,
        target: &Tableau,
        vocab: &GateVocabulary,
        timesteps: usize,
        solver: &SolverAdapter<'ctx>,
    ) -> Self {
        let num_qubits = initial.num_qubits();
        let width = initial.rows().len() as u32;
        trace!("encoding instance: {timesteps} timesteps, {num_qubits} qubits, width {width}");

        let states: Vec<StateVars<'ctx>> = (0..=timesteps)
            .map(|_| StateVars::fresh(z3, num_qubits, width))
            .collect();
        let steps: Vec<EncodedStep<'ctx>> = (0..timesteps)
            .map(|t| EncodedStep::encode(z3, vocab, &states[t], &states[t + 1], solver))
            .collect();

        states[0].pin_to(z3, initial, solver);
        let last = &states[timesteps];
        if target.is_state() && !initial.is_state() {
            last.pin_stabilizers_to(z3, target, solver);
        } else {
            last.pin_to(z3, target, solver);
        }

        Self {
            z3,
            num_qubits,
            steps,
        }
    }

    pub fn timesteps(&self) -> usize {
        self.steps.len()
    }

    fn metric_selectors(&self, metric: TargetMetric) -> Vec<&Bool<'ctx>> {
        match metric {
            TargetMetric::Gates => self
                .steps
                .iter()
                .flat_map(EncodedStep::gate_selectors)
                .collect(),
            TargetMetric::TwoQubitGates => self
                .steps
                .iter()
                .flat_map(EncodedStep::two_qubit_selectors)
                .collect(),
            TargetMetric::Depth => self.steps.iter().map(EncodedStep::active).collect(),
        }
    }

    /// Hard cardinality bound for feasibility queries.
    pub fn assert_metric_at_most(
        &self,
        metric: TargetMetric,
        bound: usize,
        solver: &SolverAdapter<'ctx>,
    ) {
        let selectors = self.metric_selectors(metric);
        if selectors.len() <= bound {
            return;
        }
        let terms: Vec<(&Bool<'ctx>, i32)> = selectors.into_iter().map(|b| (b, 1)).collect();
        solver.assert(&Bool::pb_le(self.z3, &terms, bound as i32));
    }

    /// Hard equality pin, used to hold a previously proven optimum fixed
    /// while a secondary metric is minimized.
    pub fn assert_metric_exactly(
        &self,
        metric: TargetMetric,
        value: usize,
        solver: &SolverAdapter<'ctx>,
    ) {
        let selectors = self.metric_selectors(metric);
        if selectors.is_empty() {
            debug_assert_eq!(value, 0);
            return;
        }
        let terms: Vec<(&Bool<'ctx>, i32)> = selectors.into_iter().map(|b| (b, 1)).collect();
        solver.assert(&Bool::pb_eq(self.z3, &terms, value as i32));
    }

    /// Soft objective: minimize the number of set metric selectors.
    pub fn minimize_metric(&self, metric: TargetMetric, solver: &SolverAdapter<'ctx>) {
        let one = Int::from_u64(self.z3, 1);
        let zero = Int::from_u64(self.z3, 0);
        let terms: Vec<Int<'ctx>> = self
            .metric_selectors(metric)
            .into_iter()
            .map(|b| b.ite(&one, &zero))
            .collect();
        if terms.is_empty() {
            return;
        }
        let refs: Vec<&Int<'ctx>> = terms.iter().collect();
        solver.minimize(&Int::add(self.z3, &refs));
    }

    /// Decodes a satisfying assignment into temporally ordered layers,
    /// dropping layers in which every qubit chose the no-op.
    pub fn decode(&self, model: &z3::Model<'ctx>) -> Circuit {
        let layers = self.steps.iter().map(|step| step.decode(model)).collect();
        Circuit::from_layers(self.num_qubits, layers)
    }
}
