use std::collections::BTreeSet;

use crate::error::{Result, SynthesisError};

/// The legal gate placements on a device: every single-qubit generator on
/// every qubit, and CX on every ordered pair allowed by the coupling.
///
/// Couplings are stored symmetrically. Even when the native entangler is
/// directional, both orientations are offered; reversing a CX with
/// Hadamards is outside the cost model here.
#[derive(Clone, Debug)]
pub struct GateVocabulary {
    num_qubits: usize,
    pairs: Vec<(usize, usize)>,
}

impl GateVocabulary {
    /// All-to-all connectivity.
    pub fn full(num_qubits: usize) -> Self {
        let mut pairs = Vec::new();
        for a in 0..num_qubits {
            for b in 0..num_qubits {
                if a != b {
                    pairs.push((a, b));
                }
            }
        }
        Self { num_qubits, pairs }
    }

    /// Connectivity restricted to the given undirected coupling edges.
    pub fn with_coupling(num_qubits: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut set = BTreeSet::new();
        for &(a, b) in edges {
            if a == b {
                return Err(SynthesisError::configuration(format!(
                    "coupling edge ({a}, {b}) connects a qubit to itself"
                )));
            }
            if a >= num_qubits || b >= num_qubits {
                return Err(SynthesisError::configuration(format!(
                    "coupling edge ({a}, {b}) exceeds qubit count {num_qubits}"
                )));
            }
            set.insert((a, b));
            set.insert((b, a));
        }
        Ok(Self {
            num_qubits,
            pairs: set.into_iter().collect(),
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Ordered (control, target) pairs a CX may be placed on.
    pub fn cx_pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_vocabulary_has_all_ordered_pairs() {
        let v = GateVocabulary::full(3);
        assert_eq!(v.cx_pairs().len(), 6);
    }

    #[test]
    fn coupling_is_symmetric() {
        let v = GateVocabulary::with_coupling(3, &[(0, 1)]).unwrap();
        assert_eq!(v.cx_pairs(), &[(0, 1), (1, 0)]);
    }

    #[test]
    fn rejects_out_of_range_edges() {
        assert!(GateVocabulary::with_coupling(2, &[(0, 5)]).is_err());
        assert!(GateVocabulary::with_coupling(2, &[(1, 1)]).is_err());
    }
}
