use std::fmt;

use crate::circuit::{Circuit, GateOp, SingleQubitGate};
use crate::error::{Result, SynthesisError};
use crate::pauli::PauliString;

/// One tracked Pauli row of a tableau: X/Z component masks over the
/// qubits plus the phase bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PauliRow {
    pub x: u64,
    pub z: u64,
    pub phase: bool,
}

/// Binary symplectic representation of a Clifford operator or stabilizer
/// state: each row is the image of one Pauli generator under conjugation.
///
/// Two shapes exist. A *unitary* tableau has `2n` rows, the images of
/// X_0..X_{n-1} followed by Z_0..Z_{n-1}, and pins a full Clifford
/// operator. A *state* tableau has `n` rows, an explicit stabilizer
/// generator list; synthesis towards it only pins the stabilizer half of
/// the evolved state. Phase updates follow the Aaronson-Gottesman
/// convention.
#[derive(Clone, PartialEq, Eq)]
pub struct Tableau {
    num_qubits: usize,
    rows: Vec<PauliRow>,
}

impl Tableau {
    /// The identity Clifford on `n` qubits (unitary shape).
    pub fn identity(num_qubits: usize) -> Self {
        let mut rows = Vec::with_capacity(2 * num_qubits);
        for q in 0..num_qubits {
            rows.push(PauliRow {
                x: 1 << q,
                z: 0,
                phase: false,
            });
        }
        for q in 0..num_qubits {
            rows.push(PauliRow {
                x: 0,
                z: 1 << q,
                phase: false,
            });
        }
        Self { num_qubits, rows }
    }

    /// Builds a state tableau from signed Pauli generator strings.
    ///
    /// The generators must all have the same width `n`, there must be
    /// exactly `n` of them, they must pairwise commute and they must be
    /// independent over GF(2); any violation means the input does not
    /// describe a stabilizer state and construction fails.
    pub fn from_generators(generators: &[&str]) -> Result<Self> {
        let parsed = generators
            .iter()
            .map(|s| PauliString::parse(s))
            .collect::<Result<Vec<_>>>()?;
        Self::from_pauli_strings(&parsed)
    }

    /// Same as [`Tableau::from_generators`], starting from an already
    /// parsed Pauli collection.
    pub fn from_pauli_strings(generators: &[PauliString]) -> Result<Self> {
        let Some(first) = generators.first() else {
            return Err(SynthesisError::invalid_tableau(
                "no stabilizer generators given",
            ));
        };
        let num_qubits = first.num_qubits;

        if let Some(odd) = generators.iter().find(|g| g.num_qubits != num_qubits) {
            return Err(SynthesisError::invalid_tableau(format!(
                "generator {odd} acts on {} qubits, expected {num_qubits}",
                odd.num_qubits
            )));
        }
        if generators.len() != num_qubits {
            return Err(SynthesisError::invalid_tableau(format!(
                "{} generators cannot stabilize a {num_qubits}-qubit state",
                generators.len()
            )));
        }
        for (i, a) in generators.iter().enumerate() {
            for b in generators.iter().skip(i + 1) {
                if a.anticommutes_with(b) {
                    return Err(SynthesisError::invalid_tableau(format!(
                        "generators {a} and {b} anticommute"
                    )));
                }
            }
        }
        if !symplectic_rows_independent(generators) {
            return Err(SynthesisError::invalid_tableau(
                "generators are linearly dependent",
            ));
        }

        let rows = generators
            .iter()
            .map(|g| PauliRow {
                x: g.x,
                z: g.z,
                phase: g.sign,
            })
            .collect();
        Ok(Self { num_qubits, rows })
    }

    /// The tableau of the Clifford operator a circuit implements,
    /// obtained by replaying its gates on the identity.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut tableau = Self::identity(circuit.num_qubits());
        for gate in circuit.iter_gates() {
            tableau = tableau.apply(gate);
        }
        tableau
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn rows(&self) -> &[PauliRow] {
        &self.rows
    }

    /// `true` for the `n`-row stabilizer-generator shape.
    pub fn is_state(&self) -> bool {
        self.rows.len() == self.num_qubits
    }

    /// The rows a synthesis target actually constrains: all of them for a
    /// unitary tableau, the stabilizer half for a state target evolved
    /// from a unitary-shaped start.
    pub fn stabilizer_rows(&self) -> &[PauliRow] {
        if self.is_state() {
            &self.rows
        } else {
            &self.rows[self.num_qubits..]
        }
    }

    /// Conjugates every tracked row by `gate`, yielding the evolved
    /// tableau. This is the closed-form mod-2 update the step encoding
    /// mirrors in boolean form.
    pub fn apply(&self, gate: &GateOp) -> Tableau {
        let mut rows = self.rows.clone();
        for row in &mut rows {
            apply_to_row(row, gate);
        }
        Tableau {
            num_qubits: self.num_qubits,
            rows,
        }
    }

    /// Whether `self`, taken as the current state, already realizes
    /// `target`. For a state target only the stabilizer half is compared.
    pub fn satisfies(&self, target: &Tableau) -> bool {
        if self.num_qubits != target.num_qubits {
            return false;
        }
        if target.is_state() && !self.is_state() {
            self.stabilizer_rows() == target.rows.as_slice()
        } else {
            self.rows == target.rows
        }
    }
}

fn apply_to_row(row: &mut PauliRow, gate: &GateOp) {
    match *gate {
        GateOp::Single(g, q) => {
            let x = row.x >> q & 1 == 1;
            let z = row.z >> q & 1 == 1;
            match g {
                SingleQubitGate::Nop => (),
                SingleQubitGate::X => row.phase ^= z,
                SingleQubitGate::Y => row.phase ^= x ^ z,
                SingleQubitGate::Z => row.phase ^= x,
                SingleQubitGate::H => {
                    row.phase ^= x & z;
                    row.x = row.x & !(1 << q) | (z as u64) << q;
                    row.z = row.z & !(1 << q) | (x as u64) << q;
                }
                SingleQubitGate::S => {
                    row.phase ^= x & z;
                    row.z ^= (x as u64) << q;
                }
                SingleQubitGate::Sdg => {
                    row.phase ^= x & !z;
                    row.z ^= (x as u64) << q;
                }
            }
        }
        GateOp::Cx { control, target } => {
            let xc = row.x >> control & 1 == 1;
            let zc = row.z >> control & 1 == 1;
            let xt = row.x >> target & 1 == 1;
            let zt = row.z >> target & 1 == 1;
            row.phase ^= xc & zt & !(xt ^ zc);
            row.x ^= (xc as u64) << target;
            row.z ^= (zt as u64) << control;
        }
    }
}

/// GF(2) rank check over the (x|z) row space. The basis keeps one vector
/// per leading-bit position, so reducing a new row's leading bit until no
/// basis vector matches is a full echelon reduction.
fn symplectic_rows_independent(generators: &[PauliString]) -> bool {
    let mut basis: Vec<u128> = Vec::with_capacity(generators.len());
    for g in generators {
        let mut v = g.x as u128 | (g.z as u128) << 64;
        while v != 0 {
            let lead = 127 - v.leading_zeros();
            match basis.iter().find(|b| 127 - b.leading_zeros() == lead) {
                Some(b) => v ^= b,
                None => break,
            }
        }
        if v == 0 {
            return false;
        }
        basis.push(v);
    }
    true
}

impl fmt::Debug for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tableau ({} qubits):", self.num_qubits)?;
        for row in &self.rows {
            for q in 0..self.num_qubits {
                write!(f, "{} ", row.x >> q & 1)?;
            }
            write!(f, "| ")?;
            for q in 0..self.num_qubits {
                write!(f, "{} ", row.z >> q & 1)?;
            }
            writeln!(f, "| {}", row.phase as u8)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(q: usize) -> GateOp {
        GateOp::Single(SingleQubitGate::H, q)
    }

    fn s(q: usize) -> GateOp {
        GateOp::Single(SingleQubitGate::S, q)
    }

    fn cx(c: usize, t: usize) -> GateOp {
        GateOp::Cx {
            control: c,
            target: t,
        }
    }

    #[test]
    fn identity_shape() {
        let t = Tableau::identity(2);
        assert!(!t.is_state());
        assert_eq!(t.rows().len(), 4);
        assert!(t.satisfies(&Tableau::identity(2)));
    }

    #[test]
    fn hadamard_swaps_x_and_z() {
        let t = Tableau::identity(1).apply(&h(0));
        // X -> Z, Z -> X
        assert_eq!(t.rows()[0], PauliRow { x: 0, z: 1, phase: false });
        assert_eq!(t.rows()[1], PauliRow { x: 1, z: 0, phase: false });
    }

    #[test]
    fn s_gate_on_x_gives_y() {
        let t = Tableau::identity(1).apply(&s(0));
        assert_eq!(t.rows()[0], PauliRow { x: 1, z: 1, phase: false });
        // four applications of S are the identity
        let t4 = t.apply(&s(0)).apply(&s(0)).apply(&s(0));
        assert!(t4.satisfies(&Tableau::identity(1)));
    }

    #[test]
    fn sdg_inverts_s() {
        let t = Tableau::identity(1)
            .apply(&s(0))
            .apply(&GateOp::Single(SingleQubitGate::Sdg, 0));
        assert!(t.satisfies(&Tableau::identity(1)));
    }

    #[test]
    fn bell_preparation_matches_generators() {
        let bell = Circuit::from_gates(2, [h(0), cx(0, 1)]);
        let evolved = Tableau::from_circuit(&bell);
        let target = Tableau::from_generators(&["XX", "ZZ"]).unwrap();
        assert!(evolved.satisfies(&target));
    }

    #[test]
    fn cx_is_self_inverse() {
        let t = Tableau::identity(2).apply(&cx(0, 1)).apply(&cx(0, 1));
        assert!(t.satisfies(&Tableau::identity(2)));
    }

    #[test]
    fn phase_tracking_through_conjugation() {
        // H Z H = X with positive sign; S X Sdg = Y; X Z X = -Z.
        let t = Tableau::identity(1).apply(&h(0));
        assert_eq!(t.rows()[1], PauliRow { x: 1, z: 0, phase: false });

        let flipped = Tableau::identity(1).apply(&GateOp::Single(SingleQubitGate::X, 0));
        assert_eq!(flipped.rows()[1], PauliRow { x: 0, z: 1, phase: true });
    }

    #[test]
    fn rejects_anticommuting_generators() {
        let err = Tableau::from_generators(&["XI", "ZI"]).unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidTableau(_)));
    }

    #[test]
    fn rejects_dependent_generators() {
        let err = Tableau::from_generators(&["ZZ", "ZZ"]).unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidTableau(_)));
    }

    #[test]
    fn rejects_wrong_generator_count() {
        assert!(Tableau::from_generators(&["XX"]).is_err());
    }
}
