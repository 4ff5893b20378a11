mod circuit;
mod clifford_circuit;
mod config;
mod frame;
mod kernel;
mod noise;
mod pauli;
#[cfg(feature = "python")]
mod python;
mod statevector;

pub use circuit::{
    random_unitary, rz_matrix, Circuit, CircuitCreationError, Gate, GateName, Matrix2, UNUSED_QUBIT,
};
pub use clifford_circuit::{
    CliffordCircuit, CliffordCircuitError, CliffordGate, CliffordInstruction, CompareMode,
    Condition, FrameOp, GUARD_CODE, MEASURE_RESET_CODE,
};
pub use config::{initialize_global, RunOptions, SizePolicy, Strategy};
pub use frame::{
    check_condition, pauli_commute, propagate, propagate_all_samples, BatchOutcome,
    InstructionContext, PauliFrame, PauliMode, PropagationError, SampleOutcome,
};
pub use kernel::{AmplitudeKernel, Parallel, Sequential};
pub use noise::{NoiseError, NoiseSampler};
pub use pauli::{
    pauli_demux, pauli_merge, pauli_mux, InvalidPauliLabel, NoiseDecodeError, Pauli, Phase,
    PHASE_I, PHASE_MINUS_I, PHASE_MINUS_ONE, PHASE_ONE,
};
pub use statevector::{run_circuit, StateVector, StateVectorError};

#[cfg(feature = "python")]
pub use python::python_module;
