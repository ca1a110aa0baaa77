use std::time::Instant;

use log::debug;
use z3::ast::{Bool, Int};
use z3::SatResult;

/// Outcome of one backend query. `Unknown` covers solver-side resource
/// limits and is treated as a timeout by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Sat,
    Unsat,
    Unknown,
}

/// Opaque wrapper around the z3 backend. Encoding code asserts through
/// it without knowing which instance flavor the driver picked.
pub struct SolverAdapter<'ctx> {
    z3: &'ctx z3::Context,
    backend: Backend<'ctx>,
}

enum Backend<'ctx> {
    Decision(z3::Solver<'ctx>),
    Optimizing(z3::Optimize<'ctx>),
}

impl<'ctx> SolverAdapter<'ctx> {
    pub fn decision(z3: &'ctx z3::Context) -> Self {
        Self {
            z3,
            backend: Backend::Decision(z3::Solver::new(z3)),
        }
    }

    pub fn optimizing(z3: &'ctx z3::Context) -> Self {
        Self {
            z3,
            backend: Backend::Optimizing(z3::Optimize::new(z3)),
        }
    }

    pub fn assert(&self, constraint: &Bool<'ctx>) {
        match &self.backend {
            Backend::Decision(solver) => solver.assert(constraint),
            Backend::Optimizing(opt) => opt.assert(constraint),
        }
    }

    /// Installs the objective on an optimizing instance. On a decision
    /// instance this is a bug in the driver, not a user error.
    pub fn minimize(&self, objective: &Int<'ctx>) {
        match &self.backend {
            Backend::Decision(_) => {
                unreachable!("minimize called on a decision instance")
            }
            Backend::Optimizing(opt) => opt.minimize(objective),
        }
    }

    /// Runs the query. The backend's context already carries the
    /// remaining budget; on top of that an expired deadline short-circuits
    /// here, and a decision solver gets the tighter remaining millis as a
    /// per-call parameter.
    pub fn check(&self, deadline: Option<Instant>) -> Verdict {
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Verdict::Unknown;
            }
            if let Backend::Decision(solver) = &self.backend {
                let mut params = z3::Params::new(self.z3);
                params.set_u32("timeout", remaining.as_millis().min(u32::MAX as u128) as u32);
                solver.set_params(&params);
            }
        }

        let result = match &self.backend {
            Backend::Decision(solver) => solver.check(),
            Backend::Optimizing(opt) => opt.check(&[]),
        };
        debug!("solver verdict: {result:?}");

        match result {
            SatResult::Sat => Verdict::Sat,
            SatResult::Unsat => Verdict::Unsat,
            SatResult::Unknown => Verdict::Unknown,
        }
    }

    pub fn model(&self) -> Option<z3::Model<'ctx>> {
        match &self.backend {
            Backend::Decision(solver) => solver.get_model(),
            Backend::Optimizing(opt) => opt.get_model(),
        }
    }
}

/// Reads a boolean selector out of a model, completing don't-care
/// variables to `false`.
pub fn eval_bool(model: &z3::Model, var: &Bool) -> bool {
    model
        .eval(var, true)
        .and_then(|b| b.as_bool())
        .unwrap_or(false)
}
