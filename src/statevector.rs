use std::{error::Error, fmt::Display};

use num_complex::Complex;

use crate::{
    circuit::{Circuit, Gate, Matrix2},
    config::{RunOptions, SizePolicy, Strategy},
};

/// A dense vector of `2^n` amplitudes, where bit `q` of an index holds the value of qubit `q`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    qubits: usize,
    amplitudes: Vec<Complex<f64>>,
    strategy: Strategy,
}
impl StateVector {
    /// Initialize a new state vector with `qubits` qubits in the zero state.
    pub fn zero(qubits: usize) -> Result<Self, StateVectorError> {
        let len = state_len(qubits)?;
        let mut amplitudes = vec![Complex::ZERO; len];
        amplitudes[0] = Complex::ONE;
        Ok(StateVector {
            qubits,
            amplitudes,
            strategy: Strategy::default(),
        })
    }

    /// Take ownership of caller-supplied amplitudes.
    ///
    /// The vector must have length `2^qubits`. It is not normalized.
    pub fn from_amplitudes(
        qubits: usize,
        amplitudes: Vec<Complex<f64>>,
    ) -> Result<Self, StateVectorError> {
        let expected = state_len(qubits)?;
        if amplitudes.len() != expected {
            return Err(StateVectorError::SizeMismatch {
                qubits,
                expected,
                found: amplitudes.len(),
            });
        }
        Ok(StateVector {
            qubits,
            amplitudes,
            strategy: Strategy::default(),
        })
    }

    /// Like [`StateVector::from_amplitudes`], but a vector of the wrong length
    /// is handled according to `policy`.
    pub fn from_amplitudes_with_policy(
        qubits: usize,
        amplitudes: Vec<Complex<f64>>,
        policy: SizePolicy,
    ) -> Result<Self, StateVectorError> {
        match (StateVector::from_amplitudes(qubits, amplitudes), policy) {
            (Err(StateVectorError::SizeMismatch { found, .. }), SizePolicy::Reinitialize) => {
                log::warn!(
                    "discarding supplied state of length {found}, starting from the {qubits}-qubit zero state"
                );
                StateVector::zero(qubits)
            }
            (res, _) => res,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn qubits(&self) -> usize {
        self.qubits
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub fn into_amplitudes(self) -> Vec<Complex<f64>> {
        self.amplitudes
    }

    /// The squared norm, `Σ |a_i|^2`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex::norm_sqr).sum()
    }

    pub fn hadamard(&mut self, q: usize) -> Result<(), StateVectorError> {
        self.check_qubit(q)?;
        self.strategy.kernel().hadamard(&mut self.amplitudes, q);
        Ok(())
    }

    pub fn controlled_z(&mut self, a: usize, b: usize) -> Result<(), StateVectorError> {
        self.check_qubit_pair(a, b)?;
        self.strategy.kernel().controlled_z(&mut self.amplitudes, a, b);
        Ok(())
    }

    pub fn unitary1(&mut self, u: &Matrix2, q: usize) -> Result<(), StateVectorError> {
        self.check_qubit(q)?;
        self.strategy.kernel().unitary1(&mut self.amplitudes, u, q);
        Ok(())
    }

    pub fn diag2(
        &mut self,
        modulator: &[Complex<f64>; 4],
        a: usize,
        b: usize,
    ) -> Result<(), StateVectorError> {
        self.check_qubit_pair(a, b)?;
        self.strategy
            .kernel()
            .diag2(&mut self.amplitudes, modulator, a, b);
        Ok(())
    }

    /// Apply a single gate.
    pub fn apply_gate(&mut self, gate: &Gate) -> Result<(), StateVectorError> {
        match gate {
            Gate::H(a) => self.hadamard(*a),
            Gate::Cz(a, b) => self.controlled_z(*a, *b),
            Gate::U(a, u) => self.unitary1(u, *a),
            Gate::Mod2(a, b, modulator) => self.diag2(modulator, *a, *b),
        }
    }

    /// Apply every gate of `circuit` in order.
    pub fn run(&mut self, circuit: &Circuit) -> Result<(), StateVectorError> {
        if circuit.qubits() != self.qubits {
            return Err(StateVectorError::CircuitMismatch {
                circuit: circuit.qubits(),
                state: self.qubits,
            });
        }
        log::debug!(
            "running {} gates on {} qubits ({:?})",
            circuit.gates().len(),
            self.qubits,
            self.strategy
        );
        for (i, gate) in circuit.gates().iter().enumerate() {
            log::trace!("instruction {i}: {gate:?}");
            self.apply_gate(gate)?;
        }
        Ok(())
    }

    fn check_qubit(&self, q: usize) -> Result<(), StateVectorError> {
        if q >= self.qubits {
            return Err(StateVectorError::InvalidQubitIndex {
                index: q,
                qubits: self.qubits,
            });
        }
        Ok(())
    }

    fn check_qubit_pair(&self, a: usize, b: usize) -> Result<(), StateVectorError> {
        self.check_qubit(a)?;
        self.check_qubit(b)?;
        if a == b {
            return Err(StateVectorError::RepeatedQubit { index: a });
        }
        Ok(())
    }
}

/// Run `circuit`, starting from `initial` if given and from the zero state otherwise,
/// and return the final amplitudes.
pub fn run_circuit(
    circuit: &Circuit,
    initial: Option<Vec<Complex<f64>>>,
    options: &RunOptions,
) -> Result<Vec<Complex<f64>>, StateVectorError> {
    let n = circuit.qubits();
    let state = match initial {
        Some(amplitudes) => StateVector::from_amplitudes_with_policy(n, amplitudes, options.size_policy)?,
        None => StateVector::zero(n)?,
    };
    let mut state = state.with_strategy(options.strategy);
    state.run(circuit)?;
    Ok(state.into_amplitudes())
}

/// The length of a state vector on `qubits` qubits.
fn state_len(qubits: usize) -> Result<usize, StateVectorError> {
    u32::try_from(qubits)
        .ok()
        .and_then(|q| 1usize.checked_shl(q))
        .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<Complex<f64>>())
        .ok_or(StateVectorError::TooManyQubits { qubits })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateVectorError {
    SizeMismatch {
        qubits: usize,
        expected: usize,
        found: usize,
    },
    TooManyQubits {
        qubits: usize,
    },
    InvalidQubitIndex {
        index: usize,
        qubits: usize,
    },
    RepeatedQubit {
        index: usize,
    },
    CircuitMismatch {
        circuit: usize,
        state: usize,
    },
}
impl Display for StateVectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateVectorError::SizeMismatch {
                qubits,
                expected,
                found,
            } => write!(
                f,
                "State vector of length {found} does not match {qubits} qubits (expected length {expected})"
            ),
            StateVectorError::TooManyQubits { qubits } => {
                write!(f, "A state vector on {qubits} qubits cannot be allocated")
            }
            StateVectorError::InvalidQubitIndex { index, qubits } => {
                write!(f, "Invalid qubit index {index} for state of {qubits} qubits")
            }
            StateVectorError::RepeatedQubit { index } => {
                write!(f, "Two-qubit gate applied twice to qubit {index}")
            }
            StateVectorError::CircuitMismatch { circuit, state } => write!(
                f,
                "Circuit with {circuit} qubits does not match state with {state} qubits"
            ),
        }
    }
}
impl Error for StateVectorError {}
