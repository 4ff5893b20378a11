use num_complex::Complex;
use proptest::prelude::*;

use pqsim::{
    pauli_commute, pauli_demux, pauli_merge, pauli_mux, run_circuit, Circuit, CliffordGate,
    NoiseDecodeError, Pauli, PauliMode, RunOptions, Strategy as KernelStrategy,
};

const PAULIS: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Z, Pauli::Y];

fn pauli() -> impl Strategy<Value = Pauli> {
    prop::sample::select(PAULIS.to_vec())
}

fn clifford_gate() -> impl Strategy<Value = CliffordGate> {
    (0..8u8, any::<bool>()).prop_map(|(code, flip)| {
        let (a, b) = if flip { (1, 0) } else { (0, 1) };
        match code {
            0 => CliffordGate::H(a),
            1 => CliffordGate::Cx(a, b),
            2 => CliffordGate::Cz(a, b),
            3 => CliffordGate::X(a),
            4 => CliffordGate::Y(a),
            5 => CliffordGate::Z(a),
            6 => CliffordGate::S(a),
            _ => CliffordGate::Sdg(a),
        }
    })
}

/// Whether two multi-qubit Paulis anticommute.
fn anticommute(a: &[Pauli], b: &[Pauli]) -> bool {
    a.iter()
        .zip(b)
        .fold(false, |acc, (p, q)| acc ^ p.anticommutes_with(*q))
}

fn digits() -> impl Strategy<Value = (usize, u64)> {
    (1usize..=8).prop_flat_map(|k| (Just(k), 0..4u64.pow(k as u32)))
}

fn norm_sqr(amplitudes: &[Complex<f64>]) -> f64 {
    amplitudes.iter().map(Complex::norm_sqr).sum()
}

proptest! {
    #[test]
    fn merge_is_self_inverse(p in 0..4u8, q in 0..4u8) {
        prop_assert_eq!(pauli_merge(pauli_merge(p, q).unwrap(), q), Ok(p));
    }

    #[test]
    fn merge_is_commutative_and_associative(p in pauli(), q in pauli(), r in pauli()) {
        prop_assert_eq!(p ^ q, q ^ p);
        prop_assert_eq!((p ^ q) ^ r, p ^ (q ^ r));
        prop_assert_eq!(p ^ Pauli::I, p);
    }

    #[test]
    fn demux_round_trips((k, value) in digits()) {
        let paulis = pauli_demux(k, value).unwrap();
        prop_assert_eq!(paulis.len(), k);
        prop_assert_eq!(pauli_mux(&paulis), value);
    }

    #[test]
    fn demux_rejects_extra_digits(k in 1usize..=8, extra in 0..1000u64) {
        let value = 4u64.pow(k as u32) + extra;
        prop_assert_eq!(pauli_demux(k, value), Err(NoiseDecodeError { qubits: k, value }));
    }

    #[test]
    fn conjugation_preserves_commutation(
        a in prop::collection::vec(pauli(), 2),
        b in prop::collection::vec(pauli(), 2),
        gate in clifford_gate(),
    ) {
        let before = anticommute(&a, &b);
        let (mut a, mut b) = (a, b);
        pauli_commute(&mut a, gate, PauliMode::Phase);
        pauli_commute(&mut b, gate, PauliMode::Phase);
        prop_assert_eq!(anticommute(&a, &b), before);
    }

    #[test]
    fn norm_is_preserved(qubits in 1usize..=6, gates in 0usize..60, seed in any::<u64>()) {
        let circuit = Circuit::random(qubits, gates, seed);
        let result = run_circuit(&circuit, None, &RunOptions::default()).unwrap();
        prop_assert!((norm_sqr(&result) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn strategies_agree(qubits in 1usize..=8, gates in 0usize..60, seed in any::<u64>()) {
        let circuit = Circuit::random(qubits, gates, seed);
        let sequential = run_circuit(
            &circuit,
            None,
            &RunOptions::default().with_strategy(KernelStrategy::Sequential),
        )
        .unwrap();
        let parallel = run_circuit(
            &circuit,
            None,
            &RunOptions::default().with_strategy(KernelStrategy::Parallel),
        )
        .unwrap();
        for (s, p) in sequential.iter().zip(&parallel) {
            prop_assert!((s - p).norm() < 1e-10);
        }
    }
}
