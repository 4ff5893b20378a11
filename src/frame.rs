//! Propagation of Pauli frames through Clifford circuits.
//!
//! A frame tracks, per qubit, the Pauli error that has accumulated so far,
//! together with a classical register filled by measurements and a global phase.
//! Conjugating by a Clifford gate maps the frame to another Pauli frame,
//! so no amplitudes are ever stored.

use std::{error::Error, fmt::Display};

use rayon::prelude::*;

use crate::{
    clifford_circuit::{CliffordCircuit, CliffordGate, CompareMode, Condition, FrameOp},
    pauli::{
        pauli_demux, NoiseDecodeError, Pauli, Phase, PHASE_I, PHASE_MINUS_I, PHASE_MINUS_ONE,
        PHASE_ONE,
    },
};

/// How the bare Pauli gates `X`, `Y` and `Z` act on the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PauliMode {
    /// Treat them like any other Clifford gate: the frame is unchanged,
    /// and a phase of -1 is picked up when the frame anticommutes with the gate.
    #[default]
    Phase,
    /// Merge them into the frame, without phase.
    /// This makes a classically fed-forward correction cancel a matching error.
    Cancel,
}

/// The per-sample state of frame propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauliFrame {
    paulis: Vec<Pauli>,
    register: Vec<bool>,
    phase: Phase,
}
impl PauliFrame {
    /// A frame without errors on `qubits` qubits, with a cleared register of `cbits` bits.
    pub fn zero(qubits: usize, cbits: usize) -> Self {
        PauliFrame {
            paulis: vec![Pauli::I; qubits],
            register: vec![false; cbits],
            phase: PHASE_ONE,
        }
    }

    pub fn from_parts(paulis: Vec<Pauli>, register: Vec<bool>) -> Self {
        PauliFrame {
            paulis,
            register,
            phase: PHASE_ONE,
        }
    }

    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    pub fn paulis_mut(&mut self) -> &mut [Pauli] {
        &mut self.paulis
    }

    pub fn register(&self) -> &[bool] {
        &self.register
    }

    /// The product of all phases picked up so far.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the frame holds no error on any qubit.
    pub fn is_identity(&self) -> bool {
        self.paulis.iter().all(|&p| p == Pauli::I)
    }
}

/// The phase picked up when a frame holding `p` on a qubit is conjugated by the single-qubit `gate`.
fn single_qubit_phase(p: Pauli, gate: CliffordGate) -> Phase {
    match gate {
        CliffordGate::H(_) if p == Pauli::Y => PHASE_MINUS_ONE,
        CliffordGate::X(_) if p.anticommutes_with(Pauli::X) => PHASE_MINUS_ONE,
        CliffordGate::Y(_) if p.anticommutes_with(Pauli::Y) => PHASE_MINUS_ONE,
        CliffordGate::Z(_) if p.anticommutes_with(Pauli::Z) => PHASE_MINUS_ONE,
        CliffordGate::S(_) if p.x_bit() => PHASE_MINUS_I,
        CliffordGate::Sdg(_) if p.x_bit() => PHASE_I,
        _ => PHASE_ONE,
    }
}

/// Conjugate the frame `paulis` by `gate`, returning the phase picked up.
pub fn pauli_commute(paulis: &mut [Pauli], gate: CliffordGate, mode: PauliMode) -> Phase {
    match gate {
        CliffordGate::H(a) => {
            let p = paulis[a];
            paulis[a] = Pauli::from_bits(p.z_bit(), p.x_bit());
            single_qubit_phase(p, gate)
        }
        CliffordGate::Cx(c, t) => {
            let (pc, pt) = (paulis[c], paulis[t]);
            if pc.x_bit() {
                paulis[t] ^= Pauli::X;
            }
            if pt.z_bit() {
                paulis[c] ^= Pauli::Z;
            }
            PHASE_ONE
        }
        CliffordGate::Cz(a, b) => {
            let (pa, pb) = (paulis[a], paulis[b]);
            if pa.x_bit() {
                paulis[b] ^= Pauli::Z;
            }
            if pb.x_bit() {
                paulis[a] ^= Pauli::Z;
            }
            if paulis[a].x_bit() && paulis[b].x_bit() {
                PHASE_MINUS_ONE
            } else {
                PHASE_ONE
            }
        }
        CliffordGate::X(a) | CliffordGate::Y(a) | CliffordGate::Z(a) => match mode {
            PauliMode::Phase => single_qubit_phase(paulis[a], gate),
            PauliMode::Cancel => {
                paulis[a] ^= match gate {
                    CliffordGate::X(_) => Pauli::X,
                    CliffordGate::Y(_) => Pauli::Y,
                    _ => Pauli::Z,
                };
                PHASE_ONE
            }
        },
        CliffordGate::S(a) | CliffordGate::Sdg(a) => {
            let p = paulis[a];
            paulis[a] = Pauli::from_bits(p.x_bit(), p.z_bit() ^ p.x_bit());
            single_qubit_phase(p, gate)
        }
    }
}

/// Whether a gate under `condition` fires, given the classical `register`.
///
/// # Panics
/// If a condition that is not [`CompareMode::Ignore`] reads more than 64 bits,
/// or a bit outside of `register`.
/// [`CliffordCircuit::new`] rejects such conditions.
pub fn check_condition(register: &[bool], condition: &Condition) -> bool {
    if condition.is_always() {
        return true;
    }
    assert!(
        condition.bits.len() <= u64::BITS as usize,
        "Condition on {} classical bits does not fit in 64 bits",
        condition.bits.len()
    );
    let value = condition
        .bits
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (u64::from(register[b]) << i));
    match condition.mode {
        CompareMode::Ignore => true,
        CompareMode::Equal => value == condition.target,
        CompareMode::NotEqual => value != condition.target,
    }
}

/// Propagate `frame` through `circuit`.
///
/// `noise` holds one value per noisy instruction, in order. After a noisy instruction has been applied,
/// its value is split into one Pauli per qubit argument, least significant base-4 digit first,
/// and each is merged into the frame.
///
/// Returns the phase picked up by this pass, which is also folded into the frame's phase.
/// On error the frame is left as it was at the failing instruction.
pub fn propagate(
    frame: &mut PauliFrame,
    circuit: &CliffordCircuit,
    noise: &[u64],
    mode: PauliMode,
) -> Result<Phase, PropagationError> {
    if frame.paulis.len() != circuit.qubits() || frame.register.len() != circuit.cbits() {
        return Err(PropagationError::FrameMismatch {
            qubits: frame.paulis.len(),
            cbits: frame.register.len(),
            circuit_qubits: circuit.qubits(),
            circuit_cbits: circuit.cbits(),
        });
    }
    let expected = circuit.noisy_instructions();
    if noise.len() != expected {
        return Err(PropagationError::NoiseCountMismatch {
            expected,
            found: noise.len(),
        });
    }

    let mut noise_values = noise.iter();
    let mut phase = PHASE_ONE;
    for (index, inst) in circuit.instructions().iter().enumerate() {
        log::trace!("instruction {index}: {:?}", inst.op);
        match &inst.op {
            FrameOp::Gate(gate) => {
                if check_condition(&frame.register, &inst.condition) {
                    let p = pauli_commute(&mut frame.paulis, *gate, mode);
                    phase *= p;
                    frame.phase *= p;
                }
            }
            FrameOp::MeasureReset { qubit, cbit } => {
                frame.register[*cbit] = frame.paulis[*qubit].x_bit();
                frame.paulis[*qubit] = Pauli::I;
            }
            FrameOp::Guard { qubit, forbidden } => {
                let found = frame.paulis[*qubit];
                if forbidden.contains(&found) {
                    return Err(PropagationError::GuardViolation {
                        context: InstructionContext::new(index, &inst.op),
                        found,
                    });
                }
            }
        }

        if inst.noisy {
            let qubits = inst.op.qubits();
            let Some(&value) = noise_values.next() else {
                return Err(PropagationError::NoiseCountMismatch {
                    expected,
                    found: noise.len(),
                });
            };
            let errors = pauli_demux(qubits.len(), value).map_err(|source| {
                PropagationError::NoiseDecode {
                    context: InstructionContext::new(index, &inst.op),
                    source,
                }
            })?;
            for (&q, e) in qubits.iter().zip(errors) {
                frame.paulis[q] ^= e;
            }
        }
    }
    Ok(phase)
}

/// The result of propagating one sample of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOutcome {
    /// The final frame, or the frame as it was at a failed guard.
    pub frame: PauliFrame,
    /// The guard violation that stopped this sample, if any.
    pub violation: Option<PropagationError>,
}
impl SampleOutcome {
    /// Whether a guard failed for this sample.
    pub fn check(&self) -> bool {
        self.violation.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    samples: Vec<SampleOutcome>,
}
impl BatchOutcome {
    pub fn samples(&self) -> &[SampleOutcome] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<SampleOutcome> {
        self.samples
    }

    /// One flag per sample, set when a guard failed for it.
    pub fn checks(&self) -> Vec<bool> {
        self.samples.iter().map(SampleOutcome::check).collect()
    }

    /// The number of samples stopped by a guard.
    pub fn failures(&self) -> usize {
        self.samples.iter().filter(|s| s.check()).count()
    }

    pub fn paulis(&self) -> impl Iterator<Item = &[Pauli]> {
        self.samples.iter().map(|s| s.frame.paulis())
    }

    pub fn registers(&self) -> impl Iterator<Item = &[bool]> {
        self.samples.iter().map(|s| s.frame.register())
    }
}

/// Propagate one independent sample per entry of `noise`, in parallel,
/// each starting from the error-free frame.
///
/// A guard violation only stops the affected sample and is recorded in its outcome.
/// Any other error fails the whole batch.
pub fn propagate_all_samples(
    circuit: &CliffordCircuit,
    noise: &[Vec<u64>],
    mode: PauliMode,
) -> Result<BatchOutcome, PropagationError> {
    log::debug!(
        "propagating {} samples through {} instructions",
        noise.len(),
        circuit.instructions().len()
    );
    let samples = noise
        .par_iter()
        .enumerate()
        .map(|(sample, noise)| {
            let mut frame = PauliFrame::zero(circuit.qubits(), circuit.cbits());
            match propagate(&mut frame, circuit, noise, mode) {
                Ok(_) => Ok(SampleOutcome {
                    frame,
                    violation: None,
                }),
                Err(e @ PropagationError::GuardViolation { .. }) => {
                    log::debug!("sample {sample} stopped: {e}");
                    Ok(SampleOutcome {
                        frame,
                        violation: Some(e),
                    })
                }
                Err(e) => Err(e),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = BatchOutcome { samples };
    log::debug!(
        "{} of {} samples stopped by a guard",
        outcome.failures(),
        noise.len()
    );
    Ok(outcome)
}

/// Where an error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionContext {
    pub index: usize,
    pub gate: &'static str,
    pub qubits: Vec<usize>,
}
impl InstructionContext {
    fn new(index: usize, op: &FrameOp) -> Self {
        InstructionContext {
            index,
            gate: op.name(),
            qubits: op.qubits(),
        }
    }
}
impl Display for InstructionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "instruction {}, gate '{}' on qubits {:?}",
            self.index, self.gate, self.qubits
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationError {
    GuardViolation {
        context: InstructionContext,
        found: Pauli,
    },
    NoiseDecode {
        context: InstructionContext,
        source: NoiseDecodeError,
    },
    NoiseCountMismatch {
        expected: usize,
        found: usize,
    },
    FrameMismatch {
        qubits: usize,
        cbits: usize,
        circuit_qubits: usize,
        circuit_cbits: usize,
    },
}
impl Display for PropagationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropagationError::GuardViolation { context, found } => {
                write!(f, "Frame holds forbidden Pauli {found} ({context})")
            }
            PropagationError::NoiseDecode { context, source } => {
                write!(f, "{source} ({context})")
            }
            PropagationError::NoiseCountMismatch { expected, found } => write!(
                f,
                "Circuit has {expected} noisy instructions but {found} noise values were supplied"
            ),
            PropagationError::FrameMismatch {
                qubits,
                cbits,
                circuit_qubits,
                circuit_cbits,
            } => write!(
                f,
                "Frame with {qubits} qubits and {cbits} classical bits does not match \
                 circuit with {circuit_qubits} qubits and {circuit_cbits} classical bits"
            ),
        }
    }
}
impl Error for PropagationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PropagationError::NoiseDecode { source, .. } => Some(source),
            _ => None,
        }
    }
}
