use std::{error::Error, f64::consts::PI, fmt::Display, str::FromStr};

use num_complex::Complex;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// A 2×2 complex matrix in row-major order, `m[row][col]`.
pub type Matrix2 = [[Complex<f64>; 2]; 2];

/// Placeholder used in flat qubit-argument tuples for an unused slot.
pub const UNUSED_QUBIT: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    H(usize),
    Cz(usize, usize),
    /// A general single-qubit gate given by its matrix.
    /// Unitarity is not checked.
    U(usize, Matrix2),
    /// Multiply every amplitude by `modulator[bit_a + 2 * bit_b]`,
    /// where `bit_a` and `bit_b` are the values of the two given qubits.
    /// The factors need not have unit modulus.
    Mod2(usize, usize, [Complex<f64>; 4]),
}
impl Gate {
    /// The single-qubit Z rotation `diag(e^{-iθ/2}, e^{iθ/2})`, lowered to a [`Gate::U`].
    pub fn rz(a: usize, theta: f64) -> Self {
        Gate::U(a, rz_matrix(theta))
    }

    /// The name used for this gate in flat instruction arrays.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::Cz(_, _) => "cz",
            Gate::U(_, _) => "u",
            Gate::Mod2(_, _, _) => "mod2qb",
        }
    }

    /// The qubits that this gate acts on, in argument order.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::H(a) | Gate::U(a, _) => vec![a],
            Gate::Cz(a, b) | Gate::Mod2(a, b, _) => vec![a, b],
        }
    }

    /// Whether this gate consumes an entry of the packed parameter list.
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Gate::U(_, _) | Gate::Mod2(_, _, _))
    }
}

/// The gate names accepted in flat instruction arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateName {
    H,
    Cz,
    U,
    Mod2,
    /// Z rotation whose angle is stored in the real part of the `[0][0]` parameter entry.
    Rz,
}
impl GateName {
    fn arity(self) -> usize {
        match self {
            GateName::H | GateName::U | GateName::Rz => 1,
            GateName::Cz | GateName::Mod2 => 2,
        }
    }

    fn is_parameterized(self) -> bool {
        !matches!(self, GateName::H | GateName::Cz)
    }
}
impl FromStr for GateName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h" => Ok(GateName::H),
            "cz" => Ok(GateName::Cz),
            "u" => Ok(GateName::U),
            "mod2qb" => Ok(GateName::Mod2),
            "rz" => Ok(GateName::Rz),
            _ => Err(s.to_string()),
        }
    }
}

/// The matrix `diag(e^{-iθ/2}, e^{iθ/2})`.
pub fn rz_matrix(theta: f64) -> Matrix2 {
    [
        [Complex::from_polar(1.0, -theta / 2.0), Complex::ZERO],
        [Complex::ZERO, Complex::from_polar(1.0, theta / 2.0)],
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// The number of qubits in the circuit.
    qubits: usize,
    /// The ordered list of gates in the circuit.
    gates: Vec<Gate>,
}
impl Circuit {
    pub fn new(
        qubits: usize,
        gates: impl IntoIterator<Item = Gate>,
    ) -> Result<Self, CircuitCreationError> {
        let gates: Vec<Gate> = gates.into_iter().collect();
        for (instruction, gate) in gates.iter().enumerate() {
            let args = gate.qubits();
            for &index in &args {
                if index >= qubits {
                    return Err(CircuitCreationError::InvalidQubitIndex {
                        instruction,
                        gate: gate.name(),
                        index,
                        qubits,
                    });
                }
            }
            if args.len() == 2 && args[0] == args[1] {
                return Err(CircuitCreationError::RepeatedQubit {
                    instruction,
                    gate: gate.name(),
                    index: args[0],
                });
            }
        }
        Ok(Circuit { qubits, gates })
    }

    /// Build a circuit from the flat arrays used at the simulator boundary:
    /// one gate name per instruction, a 2-slot qubit tuple per instruction
    /// (unused slots hold [`UNUSED_QUBIT`]), and a densely packed list of
    /// parameter matrices consumed in instruction order by the parameterized gates.
    ///
    /// A `mod2qb` entry reads its four factors from its matrix in row-major order.
    pub fn from_names<S: AsRef<str>>(
        qubits: usize,
        names: &[S],
        qargs: &[[i64; 2]],
        params: &[Matrix2],
    ) -> Result<Self, CircuitCreationError> {
        if names.len() != qargs.len() {
            return Err(CircuitCreationError::LengthMismatch {
                names: names.len(),
                qargs: qargs.len(),
            });
        }

        let expected_params = names
            .iter()
            .filter_map(|name| name.as_ref().parse::<GateName>().ok())
            .filter(|name| name.is_parameterized())
            .count();

        let mut params_iter = params.iter();
        let mut gates = Vec::with_capacity(names.len());
        for (instruction, (name, args)) in names.iter().zip(qargs).enumerate() {
            let name = name.as_ref();
            let gate_name: GateName =
                name.parse()
                    .map_err(|name| CircuitCreationError::UnsupportedOperation {
                        instruction,
                        name,
                        qargs: *args,
                    })?;

            let mut slots = [0; 2];
            for (slot, &arg) in args.iter().take(gate_name.arity()).enumerate() {
                slots[slot] = usize::try_from(arg).map_err(|_| {
                    CircuitCreationError::MissingQubit {
                        instruction,
                        name: name.to_string(),
                        slot,
                        qargs: *args,
                    }
                })?;
            }

            let mut next_param = || {
                params_iter
                    .next()
                    .ok_or_else(|| CircuitCreationError::MissingParameter {
                        instruction,
                        name: name.to_string(),
                        qargs: *args,
                        expected: expected_params,
                        found: params.len(),
                    })
            };
            let gate = match gate_name {
                GateName::H => Gate::H(slots[0]),
                GateName::Cz => Gate::Cz(slots[0], slots[1]),
                GateName::U => Gate::U(slots[0], *next_param()?),
                GateName::Rz => Gate::rz(slots[0], next_param()?[0][0].re),
                GateName::Mod2 => {
                    let m = next_param()?;
                    Gate::Mod2(slots[0], slots[1], [m[0][0], m[0][1], m[1][0], m[1][1]])
                }
            };
            gates.push(gate);
        }

        if params_iter.next().is_some() {
            return Err(CircuitCreationError::ParameterCountMismatch {
                expected: expected_params,
                found: params.len(),
            });
        }

        Circuit::new(qubits, gates)
    }

    /// Create a random circuit of `H`, `Cz` and random single-qubit unitaries
    /// with the given number of `qubits` and `gates`.
    pub fn random(qubits: usize, gates: usize, seed: u64) -> Self {
        assert!(qubits > 0, "A random circuit needs at least one qubit");

        let mut rng = SmallRng::seed_from_u64(seed);
        let gates = (0..gates)
            .map(|_| {
                let a = rng.random_range(0..qubits);
                let choices = if qubits > 1 { 3 } else { 2 };
                match rng.random_range(0..choices) {
                    0 => Gate::H(a),
                    1 => Gate::U(a, random_unitary(&mut rng)),
                    2 => {
                        let mut b = a;
                        while b == a {
                            b = rng.random_range(0..qubits);
                        }
                        Gate::Cz(a, b)
                    }
                    _ => unreachable!(),
                }
            })
            .collect();
        Circuit { qubits, gates }
    }

    /// The number of qubits in the circuit.
    pub fn qubits(&self) -> usize {
        self.qubits
    }

    /// The gates in the circuit, in the order that they are applied.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// The number of gates which carry a parameter matrix.
    pub fn parameterized_gates(&self) -> usize {
        self.gates.iter().filter(|g| g.is_parameterized()).count()
    }
}

/// Draw a single-qubit unitary `e^{iα} Rz(β) Ry(γ) Rz(δ)` with uniformly random angles.
pub fn random_unitary<R: Rng>(rng: &mut R) -> Matrix2 {
    let alpha = rng.random_range(0.0..2.0 * PI);
    let beta = rng.random_range(0.0..2.0 * PI);
    let gamma = rng.random_range(0.0..PI);
    let delta = rng.random_range(0.0..2.0 * PI);

    let (s, c) = (gamma / 2.0).sin_cos();
    let phase = |angle: f64| Complex::from_polar(1.0, alpha + angle);
    [
        [
            phase(-(beta + delta) / 2.0) * c,
            -phase((delta - beta) / 2.0) * s,
        ],
        [
            phase((beta - delta) / 2.0) * s,
            phase((beta + delta) / 2.0) * c,
        ],
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitCreationError {
    InvalidQubitIndex {
        instruction: usize,
        gate: &'static str,
        index: usize,
        qubits: usize,
    },
    RepeatedQubit {
        instruction: usize,
        gate: &'static str,
        index: usize,
    },
    MissingQubit {
        instruction: usize,
        name: String,
        slot: usize,
        qargs: [i64; 2],
    },
    UnsupportedOperation {
        instruction: usize,
        name: String,
        qargs: [i64; 2],
    },
    /// The parameter list ran out at a parameterized gate.
    MissingParameter {
        instruction: usize,
        name: String,
        qargs: [i64; 2],
        expected: usize,
        found: usize,
    },
    /// More parameter matrices were supplied than there are parameterized gates.
    ParameterCountMismatch {
        expected: usize,
        found: usize,
    },
    LengthMismatch {
        names: usize,
        qargs: usize,
    },
}
impl Display for CircuitCreationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitCreationError::InvalidQubitIndex {
                instruction,
                gate,
                index,
                qubits,
            } => write!(
                f,
                "Invalid qubit index {index} for circuit of {qubits} qubits \
                 (instruction {instruction}, gate '{gate}')"
            ),
            CircuitCreationError::RepeatedQubit {
                instruction,
                gate,
                index,
            } => write!(
                f,
                "Qubit {index} used twice by gate '{gate}' (instruction {instruction})"
            ),
            CircuitCreationError::MissingQubit {
                instruction,
                name,
                slot,
                qargs,
            } => write!(
                f,
                "Gate '{name}' is missing qubit argument {slot} in {qargs:?} (instruction {instruction})"
            ),
            CircuitCreationError::MissingParameter {
                instruction,
                name,
                qargs,
                expected,
                found,
            } => write!(
                f,
                "Gate '{name}' on qubits {qargs:?} has no parameter matrix: circuit has {expected} \
                 parameterized gates but {found} parameter matrices were supplied (instruction {instruction})"
            ),
            CircuitCreationError::UnsupportedOperation {
                instruction,
                name,
                qargs,
            } => write!(
                f,
                "Unsupported operation '{name}' on qubits {qargs:?} (instruction {instruction})"
            ),
            CircuitCreationError::ParameterCountMismatch { expected, found } => write!(
                f,
                "Circuit has {expected} parameterized gates but {found} parameter matrices were supplied"
            ),
            CircuitCreationError::LengthMismatch { names, qargs } => write!(
                f,
                "Got {names} gate names but {qargs} qubit argument tuples"
            ),
        }
    }
}
impl Error for CircuitCreationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_unitary_is_unitary() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..32 {
            let u = random_unitary(&mut rng);
            for i in 0..2 {
                for j in 0..2 {
                    let dot = u[0][i].conj() * u[0][j] + u[1][i].conj() * u[1][j];
                    let expected = if i == j { Complex::ONE } else { Complex::ZERO };
                    assert!((dot - expected).norm() < 1e-12, "{u:?}");
                }
            }
        }
    }

    #[test]
    fn rz_name_is_lowered() {
        let theta = 0.3;
        let params = [[[Complex::new(theta, 0.0), Complex::ZERO], [Complex::ZERO; 2]]];
        let circuit = Circuit::from_names(1, &["rz"], &[[0, UNUSED_QUBIT]], &params).unwrap();
        assert_eq!(circuit.gates(), &[Gate::U(0, rz_matrix(theta))]);
    }
}
