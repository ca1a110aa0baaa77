use z3::ast::{Ast, Bool, BV};

use crate::architecture::GateVocabulary;
use crate::circuit::{GateOp, SingleQubitGate};
use crate::encoding::StateVars;
use crate::solver::{eval_bool, SolverAdapter};

/// Gate-choice selectors for one timestep plus the constraints tying
/// them to the tableau columns on either side. One CX selector speaks
/// for both endpoints, so pairing symmetry is structural.
pub(crate) struct EncodedStep<'ctx> {
    /// `singles[q][g]` in `SingleQubitGate::ALL` order.
    singles: Vec<Vec<Bool<'ctx>>>,
    /// `(control, target, selector)` for each legal ordered pair.
    pairs: Vec<(usize, usize, Bool<'ctx>)>,
    /// True iff any non-no-op selector of this step is set.
    active: Bool<'ctx>,
}

impl<'ctx> EncodedStep<'ctx> {
    /// Creates the selectors for one step and asserts selection
    /// totality, the transition implications from `pre` to `post`, and
    /// the phase-vector update.
    pub fn encode(
        z3: &'ctx z3::Context,
        vocab: &GateVocabulary,
        pre: &StateVars<'ctx>,
        post: &StateVars<'ctx>,
        solver: &SolverAdapter<'ctx>,
    ) -> Self {
        let n = vocab.num_qubits();
        let width = pre.width();

        let singles: Vec<Vec<Bool<'ctx>>> = (0..n)
            .map(|_| {
                SingleQubitGate::ALL
                    .iter()
                    .map(|_| Bool::fresh_const(z3, "gs"))
                    .collect()
            })
            .collect();
        let pairs: Vec<(usize, usize, Bool<'ctx>)> = vocab
            .cx_pairs()
            .iter()
            .map(|&(c, t)| (c, t, Bool::fresh_const(z3, "gc")))
            .collect();

        // Phase change contributed by each qubit's selection; the CX
        // contribution is booked on the control side only.
        let phase_changes: Vec<BV<'ctx>> = (0..n)
            .map(|_| BV::fresh_const(z3, "rch", width))
            .collect();

        let zero = BV::from_u64(z3, 0, width);

        for q in 0..n {
            let x = &pre.x[q];
            let z = &pre.z[q];
            for (g, selector) in SingleQubitGate::ALL.iter().zip(&singles[q]) {
                let (x1, z1, rch) = single_qubit_update(g, x, z, &zero);
                let effect = Bool::and(
                    z3,
                    &[
                        &post.x[q]._eq(&x1),
                        &post.z[q]._eq(&z1),
                        &phase_changes[q]._eq(&rch),
                    ],
                );
                solver.assert(&selector.implies(&effect));
            }
        }

        for &(c, t, ref selector) in &pairs {
            let xc = &pre.x[c];
            let zc = &pre.z[c];
            let xt = &pre.x[t];
            let zt = &pre.z[t];
            // CX conjugation: X_c -> X_c X_t, Z_t -> Z_c Z_t, sign flips
            // where the row holds X on the control, Z on the target and
            // X on the target equals Z on the control.
            let rch = xc.bvand(zt).bvand(&xt.bvxor(zc).bvnot());
            let effect = Bool::and(
                z3,
                &[
                    &post.x[c]._eq(xc),
                    &post.x[t]._eq(&xt.bvxor(xc)),
                    &post.z[c]._eq(&zc.bvxor(zt)),
                    &post.z[t]._eq(zt),
                    &phase_changes[c]._eq(&rch),
                    &phase_changes[t]._eq(&zero),
                ],
            );
            solver.assert(&selector.implies(&effect));
        }

        // Exactly one choice per qubit per step.
        for q in 0..n {
            let mut terms: Vec<(&Bool<'ctx>, i32)> =
                singles[q].iter().map(|b| (b, 1)).collect();
            for &(c, t, ref selector) in &pairs {
                if c == q || t == q {
                    terms.push((selector, 1));
                }
            }
            solver.assert(&Bool::pb_eq(z3, &terms, 1));
        }

        // r_{t+1} = r_t xor the per-qubit phase contributions.
        let r1 = phase_changes
            .iter()
            .fold(pre.r.clone(), |acc, rch| acc.bvxor(rch));
        solver.assert(&post.r._eq(&r1));

        let active = Bool::fresh_const(z3, "act");
        let non_nop: Vec<&Bool<'ctx>> = singles
            .iter()
            .flat_map(|per_qubit| per_qubit.iter().skip(1))
            .chain(pairs.iter().map(|(_, _, b)| b))
            .collect();
        solver.assert(&active._eq(&Bool::or(z3, &non_nop)));

        Self {
            singles,
            pairs,
            active,
        }
    }

    pub fn active(&self) -> &Bool<'ctx> {
        &self.active
    }

    /// All selectors that count one gate each.
    pub fn gate_selectors(&self) -> impl Iterator<Item = &Bool<'ctx>> {
        self.singles
            .iter()
            .flat_map(|per_qubit| per_qubit.iter().skip(1))
            .chain(self.pairs.iter().map(|(_, _, b)| b))
    }

    pub fn two_qubit_selectors(&self) -> impl Iterator<Item = &Bool<'ctx>> {
        self.pairs.iter().map(|(_, _, b)| b)
    }

    /// Reads this step's selections out of a model as one layer.
    pub fn decode(&self, model: &z3::Model<'ctx>) -> Vec<GateOp> {
        let mut layer = Vec::new();
        for (q, per_qubit) in self.singles.iter().enumerate() {
            for (g, selector) in SingleQubitGate::ALL.iter().zip(per_qubit) {
                if *g != SingleQubitGate::Nop && eval_bool(model, selector) {
                    layer.push(GateOp::Single(*g, q));
                }
            }
        }
        for &(c, t, ref selector) in &self.pairs {
            if eval_bool(model, selector) {
                layer.push(GateOp::Cx {
                    control: c,
                    target: t,
                });
            }
        }
        layer
    }
}

/// Closed-form column update for one single-qubit generator: the new X
/// and Z columns plus the phase-vector change.
fn single_qubit_update<'ctx>(
    gate: &SingleQubitGate,
    x: &BV<'ctx>,
    z: &BV<'ctx>,
    zero: &BV<'ctx>,
) -> (BV<'ctx>, BV<'ctx>, BV<'ctx>) {
    match gate {
        SingleQubitGate::Nop => (x.clone(), z.clone(), zero.clone()),
        SingleQubitGate::X => (x.clone(), z.clone(), z.clone()),
        SingleQubitGate::Y => (x.clone(), z.clone(), x.bvxor(z)),
        SingleQubitGate::Z => (x.clone(), z.clone(), x.clone()),
        SingleQubitGate::H => (z.clone(), x.clone(), x.bvand(z)),
        SingleQubitGate::S => (x.clone(), x.bvxor(z), x.bvand(z)),
        SingleQubitGate::Sdg => (x.clone(), x.bvxor(z), x.bvand(&z.bvnot())),
    }
}
