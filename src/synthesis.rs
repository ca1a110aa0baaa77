use std::time::{Duration, Instant};

use log::{debug, info};

use crate::architecture::GateVocabulary;
use crate::circuit::Circuit;
use crate::config::{SynthesisConfig, TargetMetric};
use crate::encoding::CircuitEncoding;
use crate::error::{Result, SynthesisError};
use crate::solver::{SolverAdapter, Verdict};
use crate::tableau::Tableau;

/// What one synthesis run produced. `circuit` is `None` only for an
/// unresolved timeout, i.e. the deadline expired before any witness was
/// found. A result with `timeout == false` is proven optimal for the
/// requested metric.
#[derive(Clone, Debug)]
pub struct SynthesisResult {
    pub circuit: Option<Circuit>,
    pub gates: usize,
    pub depth: usize,
    pub two_qubit_gates: usize,
    pub timeout: bool,
    pub runtime: Duration,
}

fn metric_value(circuit: &Circuit, metric: TargetMetric) -> usize {
    match metric {
        TargetMetric::Gates => circuit.gates(),
        TargetMetric::Depth => circuit.depth(),
        TargetMetric::TwoQubitGates => circuit.two_qubit_gates(),
    }
}

/// Immutable bound-search state threaded through iterations.
#[derive(Clone, Debug)]
struct SearchBounds {
    lower: usize,
    upper: usize,
    witness: Circuit,
}

impl SearchBounds {
    fn seeded(witness: Circuit, metric: TargetMetric) -> Self {
        Self {
            lower: 0,
            upper: metric_value(&witness, metric),
            witness,
        }
    }

    fn settled(&self) -> bool {
        self.lower >= self.upper
    }

    fn midpoint(&self) -> usize {
        (self.lower + self.upper) / 2
    }

    fn improved(&self, witness: Circuit, metric: TargetMetric) -> Self {
        Self {
            lower: self.lower,
            upper: metric_value(&witness, metric),
            witness,
        }
    }

    fn raised(&self, lower: usize) -> Self {
        Self {
            lower,
            upper: self.upper,
            witness: self.witness.clone(),
        }
    }
}

/// Outcome of one solver query over a bounded-circuit instance.
enum Query {
    Sat(Circuit),
    Unsat,
    Timeout,
}

/// A minimization attempt's result: the best witness plus whether its
/// metric value was proven minimal before the deadline.
struct Minimization {
    witness: Circuit,
    proven: bool,
}

/// One request's encode-solve-decode context. Every query runs on a
/// fresh z3 context configured with the remaining time budget, so an
/// expiring deadline aborts the in-flight call on either backend.
struct Session<'req> {
    initial: &'req Tableau,
    target: &'req Tableau,
    vocab: &'req GateVocabulary,
    deadline: Option<Instant>,
}

impl Session<'_> {
    fn expired(&self) -> bool {
        self.deadline
            .map_or(false, |deadline| Instant::now() >= deadline)
    }

    fn context(&self) -> z3::Context {
        let mut config = z3::Config::new();
        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let ms = remaining.as_millis().clamp(1, u64::MAX as u128) as u64;
            config.set_timeout_msec(ms);
        }
        z3::Context::new(&config)
    }

    /// Feasibility query at a fixed timestep limit, with an optional hard
    /// metric bound and an optional hard metric pin.
    fn decision_query(
        &self,
        timesteps: usize,
        bound: Option<(TargetMetric, usize)>,
        pin: Option<(TargetMetric, usize)>,
    ) -> Query {
        if self.expired() {
            return Query::Timeout;
        }
        let z3 = self.context();
        let solver = SolverAdapter::decision(&z3);
        let encoding =
            CircuitEncoding::build(&z3, self.initial, self.target, self.vocab, timesteps, &solver);
        if let Some((metric, b)) = bound {
            encoding.assert_metric_at_most(metric, b, &solver);
        }
        if let Some((metric, value)) = pin {
            encoding.assert_metric_exactly(metric, value, &solver);
        }
        self.finish(&encoding, &solver)
    }

    /// One optimizing query minimizing `objective`, optionally holding a
    /// previously proven optimum fixed.
    fn optimizing_query(
        &self,
        timesteps: usize,
        objective: TargetMetric,
        pin: Option<(TargetMetric, usize)>,
    ) -> Query {
        if self.expired() {
            return Query::Timeout;
        }
        let z3 = self.context();
        let solver = SolverAdapter::optimizing(&z3);
        let encoding =
            CircuitEncoding::build(&z3, self.initial, self.target, self.vocab, timesteps, &solver);
        if let Some((metric, value)) = pin {
            encoding.assert_metric_exactly(metric, value, &solver);
        }
        encoding.minimize_metric(objective, &solver);
        self.finish(&encoding, &solver)
    }

    fn finish<'ctx>(
        &self,
        encoding: &CircuitEncoding<'ctx>,
        solver: &SolverAdapter<'ctx>,
    ) -> Query {
        match solver.check(self.deadline) {
            Verdict::Sat => match solver.model() {
                Some(model) => Query::Sat(encoding.decode(&model)),
                None => Query::Timeout,
            },
            Verdict::Unsat => Query::Unsat,
            Verdict::Unknown => Query::Timeout,
        }
    }
}

/// One of the two interchangeable search strategies. Both consume the
/// same instance shape, which is what makes the reported optimum
/// strategy-independent.
trait SearchStrategy {
    fn minimize(
        &self,
        session: &Session,
        metric: TargetMetric,
        timesteps: usize,
        pin: Option<(TargetMetric, usize)>,
        seed: Circuit,
    ) -> Result<Minimization>;
}

/// Shrinks a `[lower, upper]` window on the metric with feasibility
/// queries until the bounds meet.
struct BoundSearch;

impl SearchStrategy for BoundSearch {
    fn minimize(
        &self,
        session: &Session,
        metric: TargetMetric,
        timesteps: usize,
        pin: Option<(TargetMetric, usize)>,
        seed: Circuit,
    ) -> Result<Minimization> {
        let mut bounds = SearchBounds::seeded(seed, metric);
        while !bounds.settled() {
            let mid = bounds.midpoint();
            debug!(
                "bound search on {metric:?}: [{}, {}], trying {mid}",
                bounds.lower, bounds.upper
            );
            bounds = match session.decision_query(timesteps, Some((metric, mid)), pin) {
                Query::Sat(witness) => bounds.improved(witness, metric),
                Query::Unsat => bounds.raised(mid + 1),
                Query::Timeout => {
                    return Ok(Minimization {
                        witness: bounds.witness,
                        proven: false,
                    })
                }
            };
        }
        info!("bound search settled: {metric:?} = {}", bounds.upper);
        Ok(Minimization {
            witness: bounds.witness,
            proven: true,
        })
    }
}

/// Hands the whole minimization to the optimizing backend in one query.
struct DirectOptimization;

impl SearchStrategy for DirectOptimization {
    fn minimize(
        &self,
        session: &Session,
        metric: TargetMetric,
        timesteps: usize,
        pin: Option<(TargetMetric, usize)>,
        seed: Circuit,
    ) -> Result<Minimization> {
        match session.optimizing_query(timesteps, metric, pin) {
            Query::Sat(witness) => {
                info!(
                    "direct optimization: {metric:?} = {}",
                    metric_value(&witness, metric)
                );
                Ok(Minimization {
                    witness,
                    proven: true,
                })
            }
            Query::Timeout => Ok(Minimization {
                witness: seed,
                proven: false,
            }),
            // A feasible witness seeded this query, so the instance
            // cannot be unsatisfiable.
            Query::Unsat => Err(SynthesisError::unsatisfiable(
                "optimizing instance contradicts its seed witness",
            )),
        }
    }
}

/// Orchestrates one synthesis request: seeds a feasible witness, runs
/// the selected strategy on the primary metric, applies secondary
/// refinement, and assembles the result.
pub struct CliffordSynthesizer<'req> {
    session: Session<'req>,
    config: &'req SynthesisConfig,
    start_circuit: Option<&'req Circuit>,
    started: Instant,
}

impl<'req> CliffordSynthesizer<'req> {
    pub fn new(
        initial: &'req Tableau,
        target: &'req Tableau,
        vocab: &'req GateVocabulary,
        config: &'req SynthesisConfig,
    ) -> Self {
        let started = Instant::now();
        Self {
            session: Session {
                initial,
                target,
                vocab,
                deadline: config.time_limit.map(|limit| started + limit),
            },
            config,
            start_circuit: None,
            started,
        }
    }

    /// Seeds the search with a circuit already known to map the initial
    /// tableau to the target, typically the circuit being re-optimized.
    pub fn with_start_circuit(mut self, circuit: &'req Circuit) -> Self {
        self.start_circuit = Some(circuit);
        self
    }

    pub fn run(self) -> Result<SynthesisResult> {
        let metric = self.config.target_metric;

        if self.session.initial.satisfies(self.session.target) {
            debug!("target already satisfied by the initial tableau");
            return Ok(self.result(Some(Circuit::empty(self.session.initial.num_qubits())), false));
        }

        let seed = match self.seed_witness()? {
            Some(seed) => seed,
            // Deadline expired before any witness existed.
            None => return Ok(self.result(None, true)),
        };
        debug!(
            "seed witness: {} gates, depth {}, {} two-qubit gates",
            seed.gates(),
            seed.depth(),
            seed.two_qubit_gates()
        );

        let strategy: &dyn SearchStrategy = if self.config.use_maxsat {
            &DirectOptimization
        } else {
            &BoundSearch
        };

        let timesteps = self.timestep_limit(&seed);
        let primary = strategy.minimize(&self.session, metric, timesteps, None, seed)?;
        if !primary.proven {
            return Ok(self.result(Some(primary.witness), true));
        }

        let refined = self.refine(strategy, timesteps, primary)?;
        let timed_out = !refined.proven;
        Ok(self.result(Some(refined.witness), timed_out))
    }

    /// Secondary-objective refinement: hold the proven primary optimum
    /// and minimize the gate count under it.
    fn refine(
        &self,
        strategy: &dyn SearchStrategy,
        timesteps: usize,
        primary: Minimization,
    ) -> Result<Minimization> {
        match self.config.target_metric {
            TargetMetric::Depth if self.config.minimize_gates_after_depth_optimization => {
                // A timestep limit equal to the optimal depth pins the
                // depth by construction.
                let depth = primary.witness.depth();
                info!("refining: minimal gate count at depth {depth}");
                strategy.minimize(
                    &self.session,
                    TargetMetric::Gates,
                    depth,
                    None,
                    primary.witness,
                )
            }
            TargetMetric::TwoQubitGates
                if self.config.minimize_gates_after_two_qubit_gate_optimization =>
            {
                // Only the two-qubit count is pinned; the total gate
                // count stays free above it so extra single-qubit gates
                // remain admissible.
                let two_qubit = primary.witness.two_qubit_gates();
                info!("refining: minimal gate count at {two_qubit} two-qubit gates");
                strategy.minimize(
                    &self.session,
                    TargetMetric::Gates,
                    timesteps,
                    Some((TargetMetric::TwoQubitGates, two_qubit)),
                    primary.witness,
                )
            }
            _ => Ok(primary),
        }
    }

    /// A feasible witness to seed bounds and the timestep limit: the
    /// start circuit when re-optimizing, otherwise solver probes at
    /// geometrically growing timestep limits. Probe exhaustion means the
    /// target is unreachable within the maximum considered bound.
    fn seed_witness(&self) -> Result<Option<Circuit>> {
        if let Some(start) = self.start_circuit {
            return Ok(Some(start.clone()));
        }

        let n = self.session.initial.num_qubits();
        let cap = max_timestep_limit(n);
        let mut timesteps = self
            .config
            .initial_timestep_limit
            .unwrap_or(1)
            .clamp(1, cap);
        loop {
            debug!("probing feasibility at timestep limit {timesteps}");
            match self.session.decision_query(timesteps, None, None) {
                Query::Sat(witness) => return Ok(Some(witness)),
                Query::Timeout => return Ok(None),
                Query::Unsat if timesteps >= cap => {
                    return Err(SynthesisError::unsatisfiable(format!(
                        "target not reachable within {cap} timesteps \
                         under the given connectivity"
                    )))
                }
                Query::Unsat => timesteps = (timesteps * 2).min(cap),
            }
        }
    }

    fn timestep_limit(&self, seed: &Circuit) -> usize {
        let from_seed = match self.config.target_metric {
            TargetMetric::Gates => seed.gates(),
            TargetMetric::Depth => seed.depth(),
            TargetMetric::TwoQubitGates => {
                let base = seed.gates();
                if self
                    .config
                    .try_higher_gate_limit_for_two_qubit_gate_optimization
                {
                    2 * base
                } else {
                    base
                }
            }
        };
        from_seed.max(self.config.initial_timestep_limit.unwrap_or(0))
    }

    fn result(&self, circuit: Option<Circuit>, timeout: bool) -> SynthesisResult {
        if let Some(circuit) = &circuit {
            debug_assert!(
                replay(self.session.initial, circuit).satisfies(self.session.target),
                "witness does not implement the target tableau"
            );
        }
        let (gates, depth, two_qubit_gates) = circuit
            .as_ref()
            .map_or((0, 0, 0), |c| (c.gates(), c.depth(), c.two_qubit_gates()));
        SynthesisResult {
            circuit,
            gates,
            depth,
            two_qubit_gates,
            timeout,
            runtime: self.started.elapsed(),
        }
    }
}

/// Applies a circuit's gates to a tableau in temporal order.
fn replay(initial: &Tableau, circuit: &Circuit) -> Tableau {
    circuit
        .iter_gates()
        .fold(initial.clone(), |tableau, gate| tableau.apply(gate))
}

/// The largest timestep limit the feasibility probes will consider.
/// Uncoupled Clifford circuits need O(n^2 / log n) gates, so an
/// unreachable target here is a connectivity artifact, not a search bug.
fn max_timestep_limit(n: usize) -> usize {
    (4 * n * n + 8).max(16)
}
