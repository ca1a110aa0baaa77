use std::fmt;

/// The single-qubit Clifford generators the synthesizer may place.
///
/// `Nop` is the explicit "do nothing" choice; it exists so a time-step
/// selection is always total, and it never appears in a produced circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SingleQubitGate {
    Nop,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
}

impl SingleQubitGate {
    pub const ALL: [SingleQubitGate; 7] = [
        SingleQubitGate::Nop,
        SingleQubitGate::X,
        SingleQubitGate::Y,
        SingleQubitGate::Z,
        SingleQubitGate::H,
        SingleQubitGate::S,
        SingleQubitGate::Sdg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SingleQubitGate::Nop => "id",
            SingleQubitGate::X => "x",
            SingleQubitGate::Y => "y",
            SingleQubitGate::Z => "z",
            SingleQubitGate::H => "h",
            SingleQubitGate::S => "s",
            SingleQubitGate::Sdg => "sdg",
        }
    }
}

/// One elementary gate instance with its operand qubit(s).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateOp {
    Single(SingleQubitGate, usize),
    Cx { control: usize, target: usize },
}

impl GateOp {
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, GateOp::Cx { .. })
    }

    pub fn qubits(&self) -> (usize, Option<usize>) {
        match *self {
            GateOp::Single(_, q) => (q, None),
            GateOp::Cx { control, target } => (control, Some(target)),
        }
    }

    fn touches(&self, qubit: usize) -> bool {
        let (a, b) = self.qubits();
        a == qubit || b == Some(qubit)
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GateOp::Single(g, q) => write!(f, "{} q[{q}];", g.name()),
            GateOp::Cx { control, target } => write!(f, "cx q[{control}], q[{target}];"),
        }
    }
}

/// An ordered sequence of layers. Gates within one layer act on pairwise
/// disjoint qubits and execute simultaneously. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Circuit {
    num_qubits: usize,
    layers: Vec<Vec<GateOp>>,
}

impl Circuit {
    pub fn empty(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            layers: Vec::new(),
        }
    }

    /// Builds a circuit from a flat gate sequence, greedily packing each
    /// gate into the earliest trailing layer with free operands. Empty
    /// layers never arise.
    pub fn from_gates(num_qubits: usize, gates: impl IntoIterator<Item = GateOp>) -> Self {
        let mut circuit = Self::empty(num_qubits);
        for gate in gates {
            circuit.push_packed(gate);
        }
        circuit
    }

    /// Builds a circuit from explicit layers, dropping layers that hold
    /// no actual gate.
    pub fn from_layers(num_qubits: usize, layers: Vec<Vec<GateOp>>) -> Self {
        let layers = layers.into_iter().filter(|l| !l.is_empty()).collect();
        Self { num_qubits, layers }
    }

    fn push_packed(&mut self, gate: GateOp) {
        let fits_last = self.layers.last().is_some_and(|layer| {
            layer.iter().all(|g| {
                let (a, b) = gate.qubits();
                !g.touches(a) && b.map_or(true, |b| !g.touches(b))
            })
        });
        if fits_last {
            self.layers.last_mut().unwrap().push(gate);
        } else {
            self.layers.push(vec![gate]);
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn layers(&self) -> &[Vec<GateOp>] {
        &self.layers
    }

    pub fn iter_gates(&self) -> impl Iterator<Item = &GateOp> {
        self.layers.iter().flatten()
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn gates(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn two_qubit_gates(&self) -> usize {
        self.iter_gates().filter(|g| g.is_two_qubit()).count()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qreg q[{}];", self.num_qubits)?;
        for layer in &self.layers {
            for gate in layer {
                writeln!(f, "{gate}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_from_layers() {
        let c = Circuit::from_layers(
            2,
            vec![
                vec![GateOp::Single(SingleQubitGate::H, 0)],
                vec![],
                vec![GateOp::Cx {
                    control: 0,
                    target: 1,
                }],
            ],
        );
        assert_eq!(c.depth(), 2);
        assert_eq!(c.gates(), 2);
        assert_eq!(c.two_qubit_gates(), 1);
    }

    #[test]
    fn packing_respects_operand_overlap() {
        let c = Circuit::from_gates(
            3,
            [
                GateOp::Single(SingleQubitGate::H, 0),
                GateOp::Single(SingleQubitGate::S, 1),
                GateOp::Cx {
                    control: 0,
                    target: 1,
                },
                GateOp::Single(SingleQubitGate::Z, 2),
            ],
        );
        // h and s share a layer; cx must start a new one; z fits next to cx.
        assert_eq!(c.depth(), 2);
        assert_eq!(c.layers()[0].len(), 2);
        assert_eq!(c.layers()[1].len(), 2);
    }
}
