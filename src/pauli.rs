use std::fmt;

use crate::error::{Result, SynthesisError};

/// A signed multi-qubit Pauli operator in symplectic form.
///
/// Qubit `q` carries an X component iff bit `q` of `x` is set and a Z
/// component iff bit `q` of `z` is set; both set means Y. `sign` is the
/// leading `-` of the operator. Imaginary phases never occur for
/// stabilizer generators (they would not be Hermitian) and are rejected
/// at parse time.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PauliString {
    pub num_qubits: usize,
    pub x: u64,
    pub z: u64,
    pub sign: bool,
}

impl PauliString {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (sign, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        if body.is_empty() {
            return Err(SynthesisError::invalid_tableau(format!(
                "empty Pauli string {s:?}"
            )));
        }
        if body.len() > 64 {
            return Err(SynthesisError::invalid_tableau(format!(
                "Pauli string {s:?} exceeds 64 qubits"
            )));
        }

        let mut x = 0u64;
        let mut z = 0u64;
        for (q, c) in body.chars().enumerate() {
            match c.to_ascii_uppercase() {
                'I' => (),
                'X' => x |= 1 << q,
                'Z' => z |= 1 << q,
                'Y' => {
                    x |= 1 << q;
                    z |= 1 << q;
                }
                other => {
                    return Err(SynthesisError::invalid_tableau(format!(
                        "unexpected character {other:?} in Pauli string {s:?}"
                    )))
                }
            }
        }

        Ok(Self {
            num_qubits: body.len(),
            x,
            z,
            sign,
        })
    }

    /// Symplectic product: `false` iff `self` and `other` commute.
    pub fn anticommutes_with(&self, other: &PauliString) -> bool {
        let overlap = (self.x & other.z).count_ones() + (self.z & other.x).count_ones();
        overlap % 2 == 1
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign {
            write!(f, "-")?;
        }
        for q in 0..self.num_qubits {
            let x = self.x >> q & 1 == 1;
            let z = self.z >> q & 1 == 1;
            let c = match (x, z) {
                (false, false) => 'I',
                (true, false) => 'X',
                (false, true) => 'Z',
                (true, true) => 'Y',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_strings() {
        let p = PauliString::parse("-XYZ").unwrap();
        assert!(p.sign);
        assert_eq!(p.num_qubits, 3);
        assert_eq!(p.x, 0b011);
        assert_eq!(p.z, 0b110);
        assert_eq!(p.to_string(), "-XYZ");
    }

    #[test]
    fn rejects_garbage() {
        assert!(PauliString::parse("XQ").is_err());
        assert!(PauliString::parse("").is_err());
        assert!(PauliString::parse("+").is_err());
    }

    #[test]
    fn commutation() {
        let x = PauliString::parse("X").unwrap();
        let z = PauliString::parse("Z").unwrap();
        let xx = PauliString::parse("XX").unwrap();
        let zz = PauliString::parse("ZZ").unwrap();
        assert!(x.anticommutes_with(&z));
        assert!(!xx.anticommutes_with(&zz));
    }
}
