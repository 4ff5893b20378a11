use std::{
    error::Error,
    fmt::Display,
    ops::{BitXor, BitXorAssign},
};

use num_complex::Complex;

/// A global phase in `{1, -1, i, -i}`.
pub type Phase = Complex<i8>;

pub const PHASE_ONE: Phase = Complex { re: 1, im: 0 };
pub const PHASE_MINUS_ONE: Phase = Complex { re: -1, im: 0 };
pub const PHASE_I: Phase = Complex { re: 0, im: 1 };
pub const PHASE_MINUS_I: Phase = Complex { re: 0, im: -1 };

/// A single-qubit Pauli operator, labelled by `x + 2 * z`
/// where `x` and `z` are the bits of its symplectic representation.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pauli {
    #[default]
    I = 0,
    X = 1,
    Z = 2,
    Y = 3,
}
impl Pauli {
    pub const fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (false, true) => Pauli::Z,
            (true, true) => Pauli::Y,
        }
    }

    pub const fn label(self) -> u8 {
        self as u8
    }

    pub const fn x_bit(self) -> bool {
        self.label() & 1 != 0
    }

    pub const fn z_bit(self) -> bool {
        self.label() & 2 != 0
    }

    /// The product of two Paulis up to phase.
    pub const fn merge(self, other: Pauli) -> Pauli {
        Pauli::from_bits(self.x_bit() ^ other.x_bit(), self.z_bit() ^ other.z_bit())
    }

    pub const fn anticommutes_with(self, other: Pauli) -> bool {
        (self.x_bit() & other.z_bit()) ^ (self.z_bit() & other.x_bit())
    }
}
impl BitXor for Pauli {
    type Output = Pauli;

    fn bitxor(self, rhs: Pauli) -> Pauli {
        self.merge(rhs)
    }
}
impl BitXorAssign for Pauli {
    fn bitxor_assign(&mut self, rhs: Pauli) {
        *self = self.merge(rhs);
    }
}
impl TryFrom<u8> for Pauli {
    type Error = InvalidPauliLabel;

    fn try_from(label: u8) -> Result<Self, Self::Error> {
        match label {
            0 => Ok(Pauli::I),
            1 => Ok(Pauli::X),
            2 => Ok(Pauli::Z),
            3 => Ok(Pauli::Y),
            _ => Err(InvalidPauliLabel(label.into())),
        }
    }
}
impl TryFrom<u64> for Pauli {
    type Error = InvalidPauliLabel;

    fn try_from(label: u64) -> Result<Self, Self::Error> {
        u8::try_from(label)
            .map_err(|_| InvalidPauliLabel(label))
            .and_then(Pauli::try_from)
    }
}
impl Display for Pauli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Z => "Z",
            Pauli::Y => "Y",
        };
        write!(f, "{c}")
    }
}

/// Compose two Pauli labels by adding their x and z bits modulo 2.
pub fn pauli_merge(p1: u8, p2: u8) -> Result<u8, InvalidPauliLabel> {
    let p1 = Pauli::try_from(p1)?;
    let p2 = Pauli::try_from(p2)?;
    Ok((p1 ^ p2).label())
}

/// Split `value` into `qubits` single-qubit Paulis, least significant base-4 digit first.
pub fn pauli_demux(qubits: usize, value: u64) -> Result<Vec<Pauli>, NoiseDecodeError> {
    let fits = u32::try_from(qubits)
        .ok()
        .and_then(|k| 4u64.checked_pow(k))
        .map_or(true, |limit| value < limit);
    if !fits {
        return Err(NoiseDecodeError { qubits, value });
    }

    let mut rest = value;
    Ok((0..qubits)
        .map(|_| {
            let digit = Pauli::from_bits(rest & 1 != 0, rest & 2 != 0);
            rest >>= 2;
            digit
        })
        .collect())
}

/// Inverse of [`pauli_demux`].
///
/// # Panics
/// If more than 32 Paulis are given.
pub fn pauli_mux(paulis: &[Pauli]) -> u64 {
    assert!(paulis.len() <= 32, "At most 32 Paulis fit in a u64");
    paulis
        .iter()
        .rev()
        .fold(0, |acc, p| (acc << 2) | u64::from(p.label()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPauliLabel(pub u64);
impl Display for InvalidPauliLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid Pauli label {}, expected one of 0, 1, 2, 3", self.0)
    }
}
impl Error for InvalidPauliLabel {}

/// A noise integer had more base-4 digits than the instruction has qubits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseDecodeError {
    pub qubits: usize,
    pub value: u64,
}
impl Display for NoiseDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Noise value {} does not fit in {} base-4 digits",
            self.value, self.qubits
        )
    }
}
impl Error for NoiseDecodeError {}
