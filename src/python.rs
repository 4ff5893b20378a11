use num_complex::Complex;
use pyo3::{
    exceptions::{PyRuntimeError, PyValueError},
    prelude::*,
    wrap_pyfunction,
};

use crate::{
    circuit::{Circuit, CircuitCreationError, Matrix2},
    clifford_circuit::{CliffordCircuit, CliffordCircuitError},
    config::{initialize_global, RunOptions, SizePolicy, Strategy},
    frame::{self, PauliFrame, PauliMode, PropagationError},
    noise::NoiseError,
    pauli::{self, Pauli, Phase},
    statevector::{run_circuit, StateVectorError},
};

impl From<CircuitCreationError> for PyErr {
    fn from(value: CircuitCreationError) -> Self {
        PyErr::new::<PyValueError, _>(value.to_string())
    }
}
impl From<StateVectorError> for PyErr {
    fn from(value: StateVectorError) -> Self {
        PyErr::new::<PyValueError, _>(value.to_string())
    }
}
impl From<CliffordCircuitError> for PyErr {
    fn from(value: CliffordCircuitError) -> Self {
        PyErr::new::<PyValueError, _>(value.to_string())
    }
}
impl From<NoiseError> for PyErr {
    fn from(value: NoiseError) -> Self {
        PyErr::new::<PyValueError, _>(value.to_string())
    }
}
impl From<PropagationError> for PyErr {
    fn from(value: PropagationError) -> Self {
        match value {
            PropagationError::GuardViolation { .. } => {
                PyErr::new::<PyRuntimeError, _>(value.to_string())
            }
            _ => PyErr::new::<PyValueError, _>(value.to_string()),
        }
    }
}

fn parse_pauli_mode(mode: u8) -> PyResult<PauliMode> {
    match mode {
        0 => Ok(PauliMode::Phase),
        1 => Ok(PauliMode::Cancel),
        _ => Err(PyErr::new::<PyValueError, _>(format!(
            "Pauli mode must be 0 or 1, found {mode}"
        ))),
    }
}

// Labels and registers cross the boundary as plain ints, so that Python sees lists of ints
// and numpy integer arrays are accepted.
fn parse_pauli(label: i64) -> PyResult<Pauli> {
    u64::try_from(label)
        .ok()
        .and_then(|label| Pauli::try_from(label).ok())
        .ok_or_else(|| {
            PyErr::new::<PyValueError, _>(format!(
                "Invalid Pauli label {label}, expected one of 0, 1, 2, 3"
            ))
        })
}

fn parse_paulis(labels: &[i64]) -> PyResult<Vec<Pauli>> {
    labels.iter().map(|&label| parse_pauli(label)).collect()
}

fn labels(paulis: &[Pauli]) -> Vec<i64> {
    paulis.iter().map(|p| p.label().into()).collect()
}

fn parse_register(bits: &[i64]) -> PyResult<Vec<bool>> {
    bits.iter()
        .map(|&bit| match bit {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(PyErr::new::<PyValueError, _>(format!(
                "Classical register entries must be 0 or 1, found {bit}"
            ))),
        })
        .collect()
}

fn register(bits: &[bool]) -> Vec<i64> {
    bits.iter().map(|&b| i64::from(b)).collect()
}

fn phase_to_complex(phase: Phase) -> Complex<f64> {
    Complex {
        re: phase.re.into(),
        im: phase.im.into(),
    }
}

/// Run a circuit given as flat arrays and return the final state vector.
///
/// Starts from `vec` if given, otherwise from the zero state.
#[pyfunction]
#[pyo3(name = "run", signature = (nq, names, qargs, parms, vec=None, parallel=true, reinitialize=false))]
#[allow(clippy::too_many_arguments)]
fn py_run(
    py: Python<'_>,
    nq: usize,
    names: Vec<String>,
    qargs: Vec<[i64; 2]>,
    parms: Vec<Matrix2>,
    vec: Option<Vec<Complex<f64>>>,
    parallel: bool,
    reinitialize: bool,
) -> PyResult<Vec<Complex<f64>>> {
    let circuit = Circuit::from_names(nq, &names, &qargs, &parms)?;
    let options = RunOptions::default()
        .with_strategy(if parallel {
            Strategy::Parallel
        } else {
            Strategy::Sequential
        })
        .with_size_policy(if reinitialize {
            SizePolicy::Reinitialize
        } else {
            SizePolicy::Fail
        });
    Ok(py.allow_threads(|| run_circuit(&circuit, vec, &options))?)
}

/// Propagate a single Pauli frame and return `(phase, pvec, carr)`.
#[pyfunction]
#[pyo3(
    name = "propagate",
    signature = (pvec, carr, noisearray, opnames, noiseid, condval, contype, conbits, opqargs, opcargs, paulimode=0)
)]
#[allow(clippy::too_many_arguments)]
fn py_propagate(
    pvec: Vec<i64>,
    carr: Vec<i64>,
    noisearray: Vec<u64>,
    opnames: Vec<u8>,
    noiseid: Vec<bool>,
    condval: Vec<u64>,
    contype: Vec<u8>,
    conbits: Vec<Vec<usize>>,
    opqargs: Vec<Vec<usize>>,
    opcargs: Vec<Vec<usize>>,
    paulimode: u8,
) -> PyResult<(Complex<f64>, Vec<i64>, Vec<i64>)> {
    let circuit = CliffordCircuit::from_codes(
        pvec.len(),
        carr.len(),
        &opnames,
        &noiseid,
        &condval,
        &contype,
        &conbits,
        &opqargs,
        &opcargs,
    )?;
    let mut frame = PauliFrame::from_parts(parse_paulis(&pvec)?, parse_register(&carr)?);
    let phase = frame::propagate(
        &mut frame,
        &circuit,
        &noisearray,
        parse_pauli_mode(paulimode)?,
    )?;
    Ok((
        phase_to_complex(phase),
        labels(frame.paulis()),
        register(frame.register()),
    ))
}

/// Propagate one frame per entry of `noisearrays` and return `(checks, pvecs, carrs)`.
#[pyfunction]
#[pyo3(
    name = "propagate_all_samples",
    signature = (qlen, clen, noisearrays, opnames, noiseid, condval, contype, conbits, opqargs, opcargs, paulimode=0)
)]
#[allow(clippy::too_many_arguments)]
fn py_propagate_all_samples(
    py: Python<'_>,
    qlen: usize,
    clen: usize,
    noisearrays: Vec<Vec<u64>>,
    opnames: Vec<u8>,
    noiseid: Vec<bool>,
    condval: Vec<u64>,
    contype: Vec<u8>,
    conbits: Vec<Vec<usize>>,
    opqargs: Vec<Vec<usize>>,
    opcargs: Vec<Vec<usize>>,
    paulimode: u8,
) -> PyResult<(Vec<bool>, Vec<Vec<i64>>, Vec<Vec<i64>>)> {
    let circuit = CliffordCircuit::from_codes(
        qlen, clen, &opnames, &noiseid, &condval, &contype, &conbits, &opqargs, &opcargs,
    )?;
    let mode = parse_pauli_mode(paulimode)?;
    let outcome = py.allow_threads(|| frame::propagate_all_samples(&circuit, &noisearrays, mode))?;
    Ok((
        outcome.checks(),
        outcome.paulis().map(labels).collect(),
        outcome.registers().map(register).collect(),
    ))
}

#[pyfunction]
#[pyo3(name = "pauli_merge")]
fn py_pauli_merge(p1: i64, p2: i64) -> PyResult<i64> {
    let merged = parse_pauli(p1)? ^ parse_pauli(p2)?;
    Ok(merged.label().into())
}

#[pyfunction]
#[pyo3(name = "pauli_demux")]
fn py_pauli_demux(nqb: usize, p1: u64) -> PyResult<Vec<i64>> {
    let paulis = pauli::pauli_demux(nqb, p1)
        .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;
    Ok(labels(&paulis))
}

#[pymodule]
#[pyo3(name = "pqsim")]
pub fn python_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    if let Err(e) = initialize_global(None) {
        log::warn!("using the existing global thread pool: {e}");
    }

    m.add_function(wrap_pyfunction!(py_run, m)?)?;
    m.add_function(wrap_pyfunction!(py_propagate, m)?)?;
    m.add_function(wrap_pyfunction!(py_propagate_all_samples, m)?)?;
    m.add_function(wrap_pyfunction!(py_pauli_merge, m)?)?;
    m.add_function(wrap_pyfunction!(py_pauli_demux, m)?)?;
    Ok(())
}
