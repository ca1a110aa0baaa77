use z3::ast::{Ast, BV};

use crate::solver::SolverAdapter;
use crate::tableau::{PauliRow, Tableau};

/// Bit-vector tableau snapshot at one timestep: per qubit one X column
/// and one Z column, plus the shared phase vector. Bit `i` of a column
/// belongs to tracked row `i`.
pub(crate) struct StateVars<'ctx> {
    pub x: Vec<BV<'ctx>>,
    pub z: Vec<BV<'ctx>>,
    pub r: BV<'ctx>,
}

impl<'ctx> StateVars<'ctx> {
    pub fn fresh(z3: &'ctx z3::Context, num_qubits: usize, width: u32) -> Self {
        Self {
            x: (0..num_qubits)
                .map(|_| BV::fresh_const(z3, "x", width))
                .collect(),
            z: (0..num_qubits)
                .map(|_| BV::fresh_const(z3, "z", width))
                .collect(),
            r: BV::fresh_const(z3, "r", width),
        }
    }

    pub fn width(&self) -> u32 {
        self.r.get_size()
    }

    /// Pins this snapshot to the rows of a concrete tableau.
    pub fn pin_to(&self, z3: &'ctx z3::Context, tableau: &Tableau, solver: &SolverAdapter<'ctx>) {
        let width = self.width();
        for (q, (x, z)) in self.x.iter().zip(&self.z).enumerate() {
            let (xc, zc) = column(tableau.rows(), q);
            solver.assert(&x._eq(&BV::from_u64(z3, xc, width)));
            solver.assert(&z._eq(&BV::from_u64(z3, zc, width)));
        }
        solver.assert(&self.r._eq(&BV::from_u64(z3, phases(tableau.rows()), width)));
    }

    /// Pins only the stabilizer half of this snapshot to an `n`-row state
    /// target; the destabilizer half is left free. Tracked rows `n..2n`
    /// are the stabilizer images, so the comparison extracts the high
    /// half of every column.
    pub fn pin_stabilizers_to(
        &self,
        z3: &'ctx z3::Context,
        target: &Tableau,
        solver: &SolverAdapter<'ctx>,
    ) {
        let n = target.num_qubits() as u32;
        debug_assert_eq!(self.width(), 2 * n);
        let hi = 2 * n - 1;
        for (q, (x, z)) in self.x.iter().zip(&self.z).enumerate() {
            let (xc, zc) = column(target.rows(), q);
            solver.assert(&x.extract(hi, n)._eq(&BV::from_u64(z3, xc, n)));
            solver.assert(&z.extract(hi, n)._eq(&BV::from_u64(z3, zc, n)));
        }
        solver.assert(
            &self
                .r
                .extract(hi, n)
                ._eq(&BV::from_u64(z3, phases(target.rows()), n)),
        );
    }
}

/// Packs qubit `q`'s X and Z components across all rows into column masks.
pub(crate) fn column(rows: &[PauliRow], q: usize) -> (u64, u64) {
    let mut xc = 0u64;
    let mut zc = 0u64;
    for (i, row) in rows.iter().enumerate() {
        xc |= (row.x >> q & 1) << i;
        zc |= (row.z >> q & 1) << i;
    }
    (xc, zc)
}

pub(crate) fn phases(rows: &[PauliRow]) -> u64 {
    rows.iter()
        .enumerate()
        .fold(0u64, |acc, (i, row)| acc | (row.phase as u64) << i)
}
