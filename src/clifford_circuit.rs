use std::{error::Error, fmt::Display};

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::pauli::Pauli;

pub const MEASURE_RESET_CODE: u8 = 9;
pub const GUARD_CODE: u8 = 10;

/// The Clifford gates that Pauli frames are propagated through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliffordGate {
    H(usize),
    /// Controlled X, with the control first.
    Cx(usize, usize),
    Cz(usize, usize),
    X(usize),
    Y(usize),
    Z(usize),
    S(usize),
    /// The inverse of the S gate.
    Sdg(usize),
}
impl CliffordGate {
    /// The integer code of this gate in flat instruction arrays.
    pub fn code(&self) -> u8 {
        match self {
            CliffordGate::H(_) => 0,
            CliffordGate::Cx(_, _) => 1,
            CliffordGate::Cz(_, _) => 2,
            CliffordGate::X(_) => 3,
            CliffordGate::Y(_) => 4,
            CliffordGate::Z(_) => 5,
            CliffordGate::S(_) => 6,
            CliffordGate::Sdg(_) => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CliffordGate::H(_) => "h",
            CliffordGate::Cx(_, _) => "cx",
            CliffordGate::Cz(_, _) => "cz",
            CliffordGate::X(_) => "x",
            CliffordGate::Y(_) => "y",
            CliffordGate::Z(_) => "z",
            CliffordGate::S(_) => "s",
            CliffordGate::Sdg(_) => "sdg",
        }
    }

    /// The qubits that this gate acts on, in argument order.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            CliffordGate::H(a)
            | CliffordGate::X(a)
            | CliffordGate::Y(a)
            | CliffordGate::Z(a)
            | CliffordGate::S(a)
            | CliffordGate::Sdg(a) => vec![a],
            CliffordGate::Cx(a, b) | CliffordGate::Cz(a, b) => vec![a, b],
        }
    }
}

/// One step of a frame-propagation program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOp {
    Gate(CliffordGate),
    /// Record the X part of the frame on `qubit` into classical bit `cbit` and clear the qubit.
    MeasureReset { qubit: usize, cbit: usize },
    /// Fail if the frame on `qubit` is one of the `forbidden` Paulis.
    Guard { qubit: usize, forbidden: Vec<Pauli> },
}
impl FrameOp {
    pub fn code(&self) -> u8 {
        match self {
            FrameOp::Gate(gate) => gate.code(),
            FrameOp::MeasureReset { .. } => MEASURE_RESET_CODE,
            FrameOp::Guard { .. } => GUARD_CODE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FrameOp::Gate(gate) => gate.name(),
            FrameOp::MeasureReset { .. } => "measure_reset",
            FrameOp::Guard { .. } => "guard",
        }
    }

    pub fn qubits(&self) -> Vec<usize> {
        match self {
            FrameOp::Gate(gate) => gate.qubits(),
            FrameOp::MeasureReset { qubit, .. } | FrameOp::Guard { qubit, .. } => vec![*qubit],
        }
    }
}
impl From<CliffordGate> for FrameOp {
    fn from(gate: CliffordGate) -> Self {
        FrameOp::Gate(gate)
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompareMode {
    /// Always fire.
    #[default]
    Ignore = 0,
    Equal = 1,
    NotEqual = 2,
}
impl TryFrom<u8> for CompareMode {
    type Error = u8;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(CompareMode::Ignore),
            1 => Ok(CompareMode::Equal),
            2 => Ok(CompareMode::NotEqual),
            _ => Err(mode),
        }
    }
}

/// Classical control of a gate.
///
/// The bits of the classical register at the positions in `bits` are read as an unsigned integer,
/// `bits[0]` being the least significant, and compared against `target` according to `mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    pub target: u64,
    pub mode: CompareMode,
    pub bits: Vec<usize>,
}
impl Condition {
    pub fn always() -> Self {
        Condition::default()
    }

    pub fn equal(target: u64, bits: impl Into<Vec<usize>>) -> Self {
        Condition {
            target,
            mode: CompareMode::Equal,
            bits: bits.into(),
        }
    }

    pub fn not_equal(target: u64, bits: impl Into<Vec<usize>>) -> Self {
        Condition {
            target,
            mode: CompareMode::NotEqual,
            bits: bits.into(),
        }
    }

    pub fn is_always(&self) -> bool {
        self.mode == CompareMode::Ignore
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliffordInstruction {
    pub op: FrameOp,
    /// Only consulted for Clifford gates.
    pub condition: Condition,
    /// Whether a noise value is merged onto the instruction's qubits after it is applied.
    pub noisy: bool,
}
impl CliffordInstruction {
    pub fn new(op: impl Into<FrameOp>) -> Self {
        CliffordInstruction {
            op: op.into(),
            condition: Condition::always(),
            noisy: false,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn noisy(mut self) -> Self {
        self.noisy = true;
        self
    }
}
impl From<CliffordGate> for CliffordInstruction {
    fn from(gate: CliffordGate) -> Self {
        CliffordInstruction::new(gate)
    }
}
impl From<FrameOp> for CliffordInstruction {
    fn from(op: FrameOp) -> Self {
        CliffordInstruction::new(op)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliffordCircuit {
    /// The number of qubits in the circuit.
    qubits: usize,
    /// The length of the classical register.
    cbits: usize,
    /// The ordered list of instructions in the circuit.
    instructions: Vec<CliffordInstruction>,
}
impl CliffordCircuit {
    pub fn new<I>(
        qubits: usize,
        cbits: usize,
        instructions: impl IntoIterator<Item = I>,
    ) -> Result<Self, CliffordCircuitError>
    where
        I: Into<CliffordInstruction>,
    {
        let instructions: Vec<CliffordInstruction> =
            instructions.into_iter().map(Into::into).collect();
        for (instruction, inst) in instructions.iter().enumerate() {
            let gate = inst.op.name();
            let check_qubit = |index: usize| {
                if index >= qubits {
                    return Err(CliffordCircuitError::InvalidQubitIndex {
                        instruction,
                        gate,
                        index,
                        qubits,
                    });
                }
                Ok(())
            };
            let check_cbit = |index: usize| {
                if index >= cbits {
                    return Err(CliffordCircuitError::InvalidCbitIndex {
                        instruction,
                        gate,
                        index,
                        cbits,
                    });
                }
                Ok(())
            };

            let args = inst.op.qubits();
            for &a in &args {
                check_qubit(a)?;
            }
            if args.len() == 2 && args[0] == args[1] {
                return Err(CliffordCircuitError::RepeatedQubit {
                    instruction,
                    gate,
                    index: args[0],
                });
            }
            if let FrameOp::MeasureReset { cbit, .. } = inst.op {
                check_cbit(cbit)?;
            }

            if !inst.condition.is_always() {
                if !matches!(inst.op, FrameOp::Gate(_)) {
                    return Err(CliffordCircuitError::ConditionNotSupported { instruction, gate });
                }
                if inst.condition.bits.len() > u64::BITS as usize {
                    return Err(CliffordCircuitError::ConditionTooWide {
                        instruction,
                        bits: inst.condition.bits.len(),
                    });
                }
                for &b in &inst.condition.bits {
                    check_cbit(b)?;
                }
            }
        }
        Ok(CliffordCircuit {
            qubits,
            cbits,
            instructions,
        })
    }

    /// Build a circuit from the flat arrays used at the simulator boundary.
    ///
    /// Each instruction `i` is described by its gate code `codes[i]`, its noise flag `noisy[i]`,
    /// the classical control triple `(cond_targets[i], cond_modes[i], cond_bits[i])`,
    /// its qubit arguments `qargs[i]` and its classical arguments `cargs[i]`.
    /// For a guard (code 10) `cond_bits[i]` lists the forbidden Pauli labels instead.
    #[allow(clippy::too_many_arguments)]
    pub fn from_codes(
        qubits: usize,
        cbits: usize,
        codes: &[u8],
        noisy: &[bool],
        cond_targets: &[u64],
        cond_modes: &[u8],
        cond_bits: &[Vec<usize>],
        qargs: &[Vec<usize>],
        cargs: &[Vec<usize>],
    ) -> Result<Self, CliffordCircuitError> {
        let n = codes.len();
        for (field, len) in [
            ("noisy", noisy.len()),
            ("cond_targets", cond_targets.len()),
            ("cond_modes", cond_modes.len()),
            ("cond_bits", cond_bits.len()),
            ("qargs", qargs.len()),
            ("cargs", cargs.len()),
        ] {
            if len != n {
                return Err(CliffordCircuitError::LengthMismatch {
                    field,
                    expected: n,
                    found: len,
                });
            }
        }

        let mut instructions = Vec::with_capacity(n);
        for instruction in 0..n {
            let code = codes[instruction];
            let q = &qargs[instruction];
            let arity = match code {
                1 | 2 => 2,
                0..=7 | MEASURE_RESET_CODE | GUARD_CODE => 1,
                _ => return Err(CliffordCircuitError::UnknownGateCode { instruction, code }),
            };
            if q.len() != arity {
                return Err(CliffordCircuitError::ArgumentCount {
                    instruction,
                    code,
                    expected: arity,
                    found: q.len(),
                });
            }

            let op = match code {
                0 => CliffordGate::H(q[0]).into(),
                1 => CliffordGate::Cx(q[0], q[1]).into(),
                2 => CliffordGate::Cz(q[0], q[1]).into(),
                3 => CliffordGate::X(q[0]).into(),
                4 => CliffordGate::Y(q[0]).into(),
                5 => CliffordGate::Z(q[0]).into(),
                6 => CliffordGate::S(q[0]).into(),
                7 => CliffordGate::Sdg(q[0]).into(),
                MEASURE_RESET_CODE => match cargs[instruction].as_slice() {
                    &[cbit] => FrameOp::MeasureReset { qubit: q[0], cbit },
                    c => {
                        return Err(CliffordCircuitError::ArgumentCount {
                            instruction,
                            code,
                            expected: 1,
                            found: c.len(),
                        })
                    }
                },
                GUARD_CODE => {
                    let forbidden = cond_bits[instruction]
                        .iter()
                        .map(|&label| {
                            u8::try_from(label)
                                .ok()
                                .and_then(|label| Pauli::try_from(label).ok())
                                .ok_or(CliffordCircuitError::InvalidPauliLabel {
                                    instruction,
                                    label,
                                })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    FrameOp::Guard {
                        qubit: q[0],
                        forbidden,
                    }
                }
                _ => unreachable!(),
            };

            let condition = match op {
                FrameOp::Gate(_) => {
                    let mode = CompareMode::try_from(cond_modes[instruction]).map_err(|mode| {
                        CliffordCircuitError::InvalidCompareMode { instruction, mode }
                    })?;
                    Condition {
                        target: cond_targets[instruction],
                        mode,
                        bits: cond_bits[instruction].clone(),
                    }
                }
                _ => Condition::always(),
            };

            instructions.push(CliffordInstruction {
                op,
                condition,
                noisy: noisy[instruction],
            });
        }

        CliffordCircuit::new(qubits, cbits, instructions)
    }

    /// Create a random circuit of unconditioned Clifford gates with the given number of `qubits` and `gates`,
    /// each of which is noisy with probability one half.
    pub fn random(qubits: usize, gates: usize, seed: u64) -> Self {
        assert!(qubits > 1, "A random Clifford circuit needs at least two qubits");

        let mut rng = SmallRng::seed_from_u64(seed);
        let instructions = (0..gates)
            .map(|_| {
                let a = rng.random_range(0..qubits);
                let mut b = a;
                while b == a {
                    b = rng.random_range(0..qubits);
                }
                let gate = match rng.random_range(0..=7) {
                    0 => CliffordGate::H(a),
                    1 => CliffordGate::Cx(a, b),
                    2 => CliffordGate::Cz(a, b),
                    3 => CliffordGate::X(a),
                    4 => CliffordGate::Y(a),
                    5 => CliffordGate::Z(a),
                    6 => CliffordGate::S(a),
                    7 => CliffordGate::Sdg(a),
                    _ => unreachable!(),
                };
                CliffordInstruction {
                    op: gate.into(),
                    condition: Condition::always(),
                    noisy: rng.random_bool(0.5),
                }
            })
            .collect();
        CliffordCircuit {
            qubits,
            cbits: 0,
            instructions,
        }
    }

    /// The number of qubits in the circuit.
    pub fn qubits(&self) -> usize {
        self.qubits
    }

    /// The length of the classical register.
    pub fn cbits(&self) -> usize {
        self.cbits
    }

    /// The instructions in the circuit, in the order that they are applied.
    pub fn instructions(&self) -> &[CliffordInstruction] {
        &self.instructions
    }

    /// The number of qubits of every noisy instruction, in order.
    /// Each of them consumes one noise value during propagation.
    pub fn noise_arities(&self) -> impl Iterator<Item = usize> + '_ {
        self.instructions
            .iter()
            .filter(|inst| inst.noisy)
            .map(|inst| inst.op.qubits().len())
    }

    /// The number of noisy instructions.
    pub fn noisy_instructions(&self) -> usize {
        self.noise_arities().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliffordCircuitError {
    UnknownGateCode {
        instruction: usize,
        code: u8,
    },
    ArgumentCount {
        instruction: usize,
        code: u8,
        expected: usize,
        found: usize,
    },
    InvalidQubitIndex {
        instruction: usize,
        gate: &'static str,
        index: usize,
        qubits: usize,
    },
    InvalidCbitIndex {
        instruction: usize,
        gate: &'static str,
        index: usize,
        cbits: usize,
    },
    RepeatedQubit {
        instruction: usize,
        gate: &'static str,
        index: usize,
    },
    InvalidPauliLabel {
        instruction: usize,
        label: usize,
    },
    InvalidCompareMode {
        instruction: usize,
        mode: u8,
    },
    ConditionTooWide {
        instruction: usize,
        bits: usize,
    },
    ConditionNotSupported {
        instruction: usize,
        gate: &'static str,
    },
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}
impl Display for CliffordCircuitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliffordCircuitError::UnknownGateCode { instruction, code } => {
                write!(f, "Unknown gate code {code} (instruction {instruction})")
            }
            CliffordCircuitError::ArgumentCount {
                instruction,
                code,
                expected,
                found,
            } => write!(
                f,
                "Gate code {code} takes {expected} arguments but got {found} (instruction {instruction})"
            ),
            CliffordCircuitError::InvalidQubitIndex {
                instruction,
                gate,
                index,
                qubits,
            } => write!(
                f,
                "Invalid qubit index {index} for circuit of {qubits} qubits \
                 (instruction {instruction}, gate '{gate}')"
            ),
            CliffordCircuitError::InvalidCbitIndex {
                instruction,
                gate,
                index,
                cbits,
            } => write!(
                f,
                "Invalid classical bit index {index} for register of {cbits} bits \
                 (instruction {instruction}, gate '{gate}')"
            ),
            CliffordCircuitError::RepeatedQubit {
                instruction,
                gate,
                index,
            } => write!(
                f,
                "Qubit {index} used twice by gate '{gate}' (instruction {instruction})"
            ),
            CliffordCircuitError::InvalidPauliLabel { instruction, label } => write!(
                f,
                "Invalid Pauli label {label} in guard (instruction {instruction})"
            ),
            CliffordCircuitError::InvalidCompareMode { instruction, mode } => write!(
                f,
                "Invalid classical compare mode {mode} (instruction {instruction})"
            ),
            CliffordCircuitError::ConditionTooWide { instruction, bits } => write!(
                f,
                "Condition on {bits} classical bits does not fit in 64 bits (instruction {instruction})"
            ),
            CliffordCircuitError::ConditionNotSupported { instruction, gate } => write!(
                f,
                "Gate '{gate}' cannot be classically controlled (instruction {instruction})"
            ),
            CliffordCircuitError::LengthMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "Expected {expected} entries in '{field}' but found {found}"
            ),
        }
    }
}
impl Error for CliffordCircuitError {}
