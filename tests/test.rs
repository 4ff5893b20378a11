use num_complex::Complex;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use pqsim::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_almost_eq(result: Complex<f64>, expected: Complex<f64>, i: usize) {
    assert!(
        (result - expected).norm() < 1e-10,
        "Mismatch at index {i}: {result} != {expected}"
    );
}

fn assert_all_almost_eq(result: &[Complex<f64>], expected: &[Complex<f64>]) {
    assert_eq!(result.len(), expected.len());
    for (i, (&r, &e)) in result.iter().zip(expected).enumerate() {
        assert_almost_eq(r, e, i);
    }
}

fn real(values: &[f64]) -> Vec<Complex<f64>> {
    values.iter().map(|&v| Complex::from(v)).collect()
}

fn random_state(qubits: usize, seed: u64) -> Vec<Complex<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..1 << qubits)
        .map(|_| Complex::new(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5))
        .collect()
}

const STRATEGIES: [Strategy; 2] = [Strategy::Sequential, Strategy::Parallel];

mod statevector {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn run(circuit: &Circuit, strategy: Strategy) -> Vec<Complex<f64>> {
        run_circuit(
            circuit,
            None,
            &RunOptions::default().with_strategy(strategy),
        )
        .unwrap()
    }

    #[test]
    fn zero() {
        init_logging();
        let circuit = Circuit::new(3, []).unwrap();
        for strategy in STRATEGIES {
            let result = run(&circuit, strategy);
            assert_all_almost_eq(&result, &real(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        }
    }

    #[test]
    fn bell_state() {
        init_logging();
        let prepared = Circuit::new(2, [Gate::H(0), Gate::H(1), Gate::Cz(0, 1)]).unwrap();
        let bell = Circuit::new(
            2,
            [Gate::H(0), Gate::H(1), Gate::Cz(0, 1), Gate::H(1)],
        )
        .unwrap();
        for strategy in STRATEGIES {
            assert_all_almost_eq(&run(&prepared, strategy), &real(&[0.5, 0.5, 0.5, -0.5]));
            assert_all_almost_eq(
                &run(&bell, strategy),
                &real(&[FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2]),
            );
        }
    }

    #[test]
    fn hadamard_is_involution() {
        let original = random_state(4, 1);
        for strategy in STRATEGIES {
            for q in 0..4 {
                let mut state = StateVector::from_amplitudes(4, original.clone())
                    .unwrap()
                    .with_strategy(strategy);
                state.hadamard(q).unwrap();
                state.hadamard(q).unwrap();
                assert_all_almost_eq(state.amplitudes(), &original);
            }
        }
    }

    #[test]
    fn controlled_z_is_symmetric() {
        let original = random_state(3, 2);
        for strategy in STRATEGIES {
            let mut ab = StateVector::from_amplitudes(3, original.clone())
                .unwrap()
                .with_strategy(strategy);
            let mut ba = ab.clone();
            ab.controlled_z(0, 2).unwrap();
            ba.controlled_z(2, 0).unwrap();
            assert_eq!(ab.amplitudes(), ba.amplitudes());

            for (i, (&result, &before)) in ab.amplitudes().iter().zip(&original).enumerate() {
                let expected = if i & 0b101 == 0b101 { -before } else { before };
                assert_almost_eq(result, expected, i);
            }

            ab.controlled_z(0, 2).unwrap();
            assert_all_almost_eq(ab.amplitudes(), &original);
        }
    }

    #[test]
    fn unitary_flips_target() {
        let x = [
            [Complex::ZERO, Complex::ONE],
            [Complex::ONE, Complex::ZERO],
        ];
        let circuit = Circuit::new(3, [Gate::U(1, x)]).unwrap();
        for strategy in STRATEGIES {
            let result = run(&circuit, strategy);
            for (i, &r) in result.iter().enumerate() {
                let expected = if i == 0b010 { Complex::ONE } else { Complex::ZERO };
                assert_almost_eq(r, expected, i);
            }
        }
    }

    #[test]
    fn diagonal_modulation() {
        let modulator = [
            Complex::new(1.0, 0.0),
            Complex::new(2.0, 0.0),
            Complex::new(0.0, 3.0),
            Complex::new(4.0, -1.0),
        ];
        for strategy in STRATEGIES {
            let mut state = StateVector::from_amplitudes(3, vec![Complex::ONE; 8])
                .unwrap()
                .with_strategy(strategy);
            state.diag2(&modulator, 2, 0).unwrap();
            for (i, &r) in state.amplitudes().iter().enumerate() {
                let bit_a = (i >> 2) & 1;
                let bit_b = i & 1;
                assert_almost_eq(r, modulator[bit_a + 2 * bit_b], i);
            }
        }
    }

    #[test]
    fn sequential_matches_parallel() {
        init_logging();
        let qubits = 14;
        let random = Circuit::random(qubits, 200, 5);
        let modulator = [
            Complex::new(0.5, 0.5),
            Complex::ONE,
            Complex::new(0.0, -1.0),
            Complex::new(-1.5, 0.0),
        ];
        let circuit = Circuit::new(
            qubits,
            random.gates().iter().copied().chain([
                Gate::Mod2(13, 2, modulator),
                Gate::Mod2(1, 12, modulator),
                Gate::Cz(13, 0),
                Gate::H(13),
            ]),
        )
        .unwrap();

        let sequential = run(&circuit, Strategy::Sequential);
        let parallel = run(&circuit, Strategy::Parallel);
        assert_all_almost_eq(&parallel, &sequential);
    }

    #[test]
    fn starts_from_supplied_state() {
        let circuit = Circuit::new(2, [Gate::H(0)]).unwrap();
        let initial = real(&[0.0, 1.0, 0.0, 0.0]);
        let result = run_circuit(&circuit, Some(initial), &RunOptions::default()).unwrap();
        assert_all_almost_eq(&result, &real(&[FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0, 0.0]));
    }

    #[test]
    fn size_mismatch_fails_by_default() {
        let circuit = Circuit::new(2, [Gate::H(0)]).unwrap();
        let result = run_circuit(&circuit, Some(vec![Complex::ONE; 3]), &RunOptions::default());
        assert_eq!(
            result,
            Err(StateVectorError::SizeMismatch {
                qubits: 2,
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn size_mismatch_reinitializes_on_request() {
        init_logging();
        let circuit = Circuit::new(2, [Gate::H(0)]).unwrap();
        let options = RunOptions::default().with_size_policy(SizePolicy::Reinitialize);
        let result = run_circuit(&circuit, Some(vec![Complex::ONE; 3]), &options).unwrap();
        assert_all_almost_eq(&result, &real(&[FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0]));
    }

    #[test]
    fn circuit_mismatch() {
        let circuit = Circuit::new(2, [Gate::H(0)]).unwrap();
        let mut state = StateVector::zero(3).unwrap();
        assert_eq!(
            state.run(&circuit),
            Err(StateVectorError::CircuitMismatch {
                circuit: 2,
                state: 3
            })
        );
    }

    #[test]
    fn invalid_qubit_index() {
        assert_eq!(
            Circuit::new(2, [Gate::H(0), Gate::Cz(1, 2)]),
            Err(CircuitCreationError::InvalidQubitIndex {
                instruction: 1,
                gate: "cz",
                index: 2,
                qubits: 2
            })
        );
        assert_eq!(
            Circuit::new(2, [Gate::Cz(1, 1)]),
            Err(CircuitCreationError::RepeatedQubit {
                instruction: 0,
                gate: "cz",
                index: 1
            })
        );
    }

    #[test]
    fn from_names() {
        let u = [
            [Complex::new(0.0, 1.0), Complex::ZERO],
            [Complex::ZERO, Complex::ONE],
        ];
        let m = [
            [Complex::new(1.0, 0.0), Complex::new(2.0, 0.0)],
            [Complex::new(3.0, 0.0), Complex::new(4.0, 0.0)],
        ];
        let circuit = Circuit::from_names(
            2,
            &["h", "u", "cz", "mod2qb"],
            &[[0, UNUSED_QUBIT], [1, UNUSED_QUBIT], [0, 1], [1, 0]],
            &[u, m],
        )
        .unwrap();
        assert_eq!(
            circuit.gates(),
            &[
                Gate::H(0),
                Gate::U(1, u),
                Gate::Cz(0, 1),
                Gate::Mod2(1, 0, [m[0][0], m[0][1], m[1][0], m[1][1]]),
            ]
        );
        assert_eq!(circuit.parameterized_gates(), 2);
    }

    #[test]
    fn rz_is_lowered_to_unitary() {
        let theta = 0.7;
        let param = [
            [Complex::from(theta), Complex::ZERO],
            [Complex::ZERO, Complex::ZERO],
        ];
        let circuit =
            Circuit::from_names(1, &["h", "rz"], &[[0, -1], [0, -1]], &[param]).unwrap();
        assert_eq!(circuit.gates()[1], Gate::U(0, rz_matrix(theta)));

        let result = run(&circuit, Strategy::Sequential);
        assert_almost_eq(
            result[0],
            Complex::from_polar(FRAC_1_SQRT_2, -theta / 2.0),
            0,
        );
        assert_almost_eq(
            result[1],
            Complex::from_polar(FRAC_1_SQRT_2, theta / 2.0),
            1,
        );
    }

    #[test]
    fn unsupported_operation() {
        assert_eq!(
            Circuit::from_names(2, &["h", "t"], &[[0, -1], [0, -1]], &[]),
            Err(CircuitCreationError::UnsupportedOperation {
                instruction: 1,
                name: "t".to_string(),
                qargs: [0, -1]
            })
        );
    }

    #[test]
    fn missing_qubit() {
        assert_eq!(
            Circuit::from_names(2, &["cz"], &[[0, UNUSED_QUBIT]], &[]),
            Err(CircuitCreationError::MissingQubit {
                instruction: 0,
                name: "cz".to_string(),
                slot: 1,
                qargs: [0, UNUSED_QUBIT]
            })
        );
    }

    #[test]
    fn parameter_count_mismatch() {
        let u = [[Complex::ONE, Complex::ZERO], [Complex::ZERO, Complex::ONE]];
        assert_eq!(
            Circuit::from_names(2, &["u", "h", "mod2qb"], &[[0, -1], [1, -1], [1, 0]], &[u]),
            Err(CircuitCreationError::MissingParameter {
                instruction: 2,
                name: "mod2qb".to_string(),
                qargs: [1, 0],
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Circuit::from_names(1, &["h"], &[[0, -1]], &[u]),
            Err(CircuitCreationError::ParameterCountMismatch {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn too_many_qubits() {
        assert_eq!(
            StateVector::zero(200),
            Err(StateVectorError::TooManyQubits { qubits: 200 })
        );
    }
}

mod pauli_frame {
    use super::*;
    use CliffordGate::*;

    fn frame(paulis: &[Pauli], cbits: usize) -> PauliFrame {
        PauliFrame::from_parts(paulis.to_vec(), vec![false; cbits])
    }

    #[test]
    fn x_through_hadamard() {
        let circuit = CliffordCircuit::new(1, 0, [H(0)]).unwrap();

        let mut f = frame(&[Pauli::X], 0);
        assert_eq!(propagate(&mut f, &circuit, &[], PauliMode::Phase), Ok(PHASE_ONE));
        assert_eq!(f.paulis(), &[Pauli::Z]);

        let mut f = frame(&[Pauli::Y], 0);
        assert_eq!(
            propagate(&mut f, &circuit, &[], PauliMode::Phase),
            Ok(PHASE_MINUS_ONE)
        );
        assert_eq!(f.paulis(), &[Pauli::Y]);
        assert_eq!(f.phase(), PHASE_MINUS_ONE);
    }

    #[test]
    fn controlled_x() {
        for (before, after) in [
            ([Pauli::X, Pauli::I], [Pauli::X, Pauli::X]),
            ([Pauli::I, Pauli::Z], [Pauli::Z, Pauli::Z]),
            ([Pauli::I, Pauli::X], [Pauli::I, Pauli::X]),
            ([Pauli::Z, Pauli::I], [Pauli::Z, Pauli::I]),
            ([Pauli::Y, Pauli::Y], [Pauli::X, Pauli::Z]),
        ] {
            let mut paulis = before;
            assert_eq!(pauli_commute(&mut paulis, Cx(0, 1), PauliMode::Phase), PHASE_ONE);
            assert_eq!(paulis, after, "{before:?}");
        }
    }

    #[test]
    fn controlled_z() {
        for (before, after, phase) in [
            ([Pauli::X, Pauli::I], [Pauli::X, Pauli::Z], PHASE_ONE),
            ([Pauli::I, Pauli::X], [Pauli::Z, Pauli::X], PHASE_ONE),
            ([Pauli::X, Pauli::X], [Pauli::Y, Pauli::Y], PHASE_MINUS_ONE),
            ([Pauli::Z, Pauli::Z], [Pauli::Z, Pauli::Z], PHASE_ONE),
        ] {
            let mut paulis = before;
            assert_eq!(pauli_commute(&mut paulis, Cz(0, 1), PauliMode::Phase), phase);
            assert_eq!(paulis, after, "{before:?}");

            let mut swapped = before;
            assert_eq!(pauli_commute(&mut swapped, Cz(1, 0), PauliMode::Phase), phase);
            assert_eq!(swapped, after, "{before:?}");
        }
    }

    #[test]
    fn bare_paulis() {
        let mut paulis = [Pauli::Z];
        assert_eq!(pauli_commute(&mut paulis, X(0), PauliMode::Phase), PHASE_MINUS_ONE);
        assert_eq!(paulis, [Pauli::Z]);
        assert_eq!(pauli_commute(&mut paulis, Z(0), PauliMode::Phase), PHASE_ONE);
        assert_eq!(pauli_commute(&mut paulis, Y(0), PauliMode::Phase), PHASE_MINUS_ONE);

        let mut paulis = [Pauli::X];
        assert_eq!(pauli_commute(&mut paulis, X(0), PauliMode::Cancel), PHASE_ONE);
        assert_eq!(paulis, [Pauli::I]);
        pauli_commute(&mut paulis, Y(0), PauliMode::Cancel);
        assert_eq!(paulis, [Pauli::Y]);
        pauli_commute(&mut paulis, Z(0), PauliMode::Cancel);
        assert_eq!(paulis, [Pauli::X]);
    }

    #[test]
    fn measure_reset() {
        let circuit = CliffordCircuit::new(
            2,
            2,
            [
                FrameOp::MeasureReset { qubit: 0, cbit: 1 },
                FrameOp::MeasureReset { qubit: 1, cbit: 0 },
            ],
        )
        .unwrap();

        let mut f = frame(&[Pauli::Y, Pauli::Z], 2);
        propagate(&mut f, &circuit, &[], PauliMode::Phase).unwrap();
        assert!(f.is_identity());
        assert_eq!(f.register(), &[false, true]);
    }

    #[test]
    fn classically_controlled_correction() {
        init_logging();
        let circuit = CliffordCircuit::new(
            2,
            1,
            [
                CliffordInstruction::new(FrameOp::MeasureReset { qubit: 0, cbit: 0 }),
                CliffordInstruction::new(X(1)).with_condition(Condition::equal(1, [0])),
            ],
        )
        .unwrap();

        let mut f = frame(&[Pauli::X, Pauli::X], 1);
        propagate(&mut f, &circuit, &[], PauliMode::Cancel).unwrap();
        assert!(f.is_identity());
        assert_eq!(f.register(), &[true]);

        let mut f = frame(&[Pauli::I, Pauli::X], 1);
        propagate(&mut f, &circuit, &[], PauliMode::Cancel).unwrap();
        assert_eq!(f.paulis(), &[Pauli::I, Pauli::X]);
        assert_eq!(f.register(), &[false]);
    }

    #[test]
    fn not_equal_condition() {
        let circuit = CliffordCircuit::new(
            1,
            2,
            [CliffordInstruction::new(H(0)).with_condition(Condition::not_equal(0b10, [0, 1]))],
        )
        .unwrap();

        let mut f = PauliFrame::from_parts(vec![Pauli::X], vec![false, true]);
        propagate(&mut f, &circuit, &[], PauliMode::Phase).unwrap();
        assert_eq!(f.paulis(), &[Pauli::X]);

        let mut f = PauliFrame::from_parts(vec![Pauli::X], vec![true, true]);
        propagate(&mut f, &circuit, &[], PauliMode::Phase).unwrap();
        assert_eq!(f.paulis(), &[Pauli::Z]);
    }

    #[test]
    fn noise_is_merged_little_endian() {
        let circuit = CliffordCircuit::new(
            2,
            0,
            [CliffordInstruction::new(Cx(0, 1)).noisy()],
        )
        .unwrap();
        let mut f = PauliFrame::zero(2, 0);
        propagate(&mut f, &circuit, &[0b10_01], PauliMode::Phase).unwrap();
        assert_eq!(f.paulis(), &[Pauli::X, Pauli::Z]);
    }

    #[test]
    fn noise_is_applied_after_the_gate() {
        let circuit =
            CliffordCircuit::new(1, 0, [CliffordInstruction::new(H(0)).noisy()]).unwrap();
        let mut f = PauliFrame::zero(1, 0);
        propagate(&mut f, &circuit, &[1], PauliMode::Phase).unwrap();
        assert_eq!(f.paulis(), &[Pauli::X]);
    }

    #[test]
    fn noise_decode_error() {
        let circuit = CliffordCircuit::new(
            2,
            0,
            [
                CliffordInstruction::new(H(0)),
                CliffordInstruction::new(Cz(0, 1)).noisy(),
            ],
        )
        .unwrap();
        let mut f = PauliFrame::zero(2, 0);
        assert_eq!(
            propagate(&mut f, &circuit, &[16], PauliMode::Phase),
            Err(PropagationError::NoiseDecode {
                context: InstructionContext {
                    index: 1,
                    gate: "cz",
                    qubits: vec![0, 1]
                },
                source: NoiseDecodeError {
                    qubits: 2,
                    value: 16
                }
            })
        );
    }

    #[test]
    fn noise_count_mismatch() {
        let circuit =
            CliffordCircuit::new(1, 0, [CliffordInstruction::new(H(0)).noisy()]).unwrap();
        let mut f = PauliFrame::zero(1, 0);
        assert_eq!(
            propagate(&mut f, &circuit, &[], PauliMode::Phase),
            Err(PropagationError::NoiseCountMismatch {
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn frame_mismatch() {
        let circuit = CliffordCircuit::new(2, 1, [H(0)]).unwrap();
        let mut f = PauliFrame::zero(2, 0);
        assert_eq!(
            propagate(&mut f, &circuit, &[], PauliMode::Phase),
            Err(PropagationError::FrameMismatch {
                qubits: 2,
                cbits: 0,
                circuit_qubits: 2,
                circuit_cbits: 1
            })
        );
    }

    #[test]
    fn guard_is_fatal_for_a_single_sample() {
        let circuit = CliffordCircuit::new(
            1,
            0,
            [
                FrameOp::Gate(H(0)),
                FrameOp::Guard {
                    qubit: 0,
                    forbidden: vec![Pauli::X, Pauli::Y],
                },
            ],
        )
        .unwrap();

        let mut f = frame(&[Pauli::Z], 0);
        assert_eq!(
            propagate(&mut f, &circuit, &[], PauliMode::Phase),
            Err(PropagationError::GuardViolation {
                context: InstructionContext {
                    index: 1,
                    gate: "guard",
                    qubits: vec![0]
                },
                found: Pauli::X
            })
        );

        let mut f = frame(&[Pauli::X], 0);
        assert_eq!(propagate(&mut f, &circuit, &[], PauliMode::Phase), Ok(PHASE_ONE));
    }

    #[test]
    fn guard_violation_is_recorded_per_sample() {
        init_logging();
        let circuit = CliffordCircuit::new(
            1,
            0,
            [
                CliffordInstruction::new(X(0)).noisy(),
                CliffordInstruction::new(FrameOp::Guard {
                    qubit: 0,
                    forbidden: vec![Pauli::X, Pauli::Y],
                }),
                CliffordInstruction::new(H(0)),
            ],
        )
        .unwrap();
        let noise = vec![vec![0], vec![1], vec![2], vec![3]];

        let outcome = propagate_all_samples(&circuit, &noise, PauliMode::Phase).unwrap();
        assert_eq!(outcome.checks(), vec![false, true, false, true]);
        assert_eq!(outcome.failures(), 2);
        // Stopped samples keep the frame they had at the guard.
        let paulis: Vec<_> = outcome.paulis().map(<[Pauli]>::to_vec).collect();
        assert_eq!(
            paulis,
            vec![vec![Pauli::I], vec![Pauli::X], vec![Pauli::X], vec![Pauli::Y]]
        );
        assert!(matches!(
            outcome.samples()[1].violation,
            Some(PropagationError::GuardViolation {
                found: Pauli::X,
                ..
            })
        ));
    }

    #[test]
    fn noiseless_samples_are_identical() {
        let circuit = CliffordCircuit::new(
            3,
            2,
            [
                CliffordInstruction::new(H(0)),
                CliffordInstruction::new(Cx(0, 1)),
                CliffordInstruction::new(S(2)),
                CliffordInstruction::new(FrameOp::MeasureReset { qubit: 1, cbit: 0 }),
                CliffordInstruction::new(Z(2)).with_condition(Condition::equal(1, [0])),
                CliffordInstruction::new(FrameOp::MeasureReset { qubit: 2, cbit: 1 }),
            ],
        )
        .unwrap();
        let samples = 100;
        let noise = vec![Vec::new(); samples];

        let outcome = propagate_all_samples(&circuit, &noise, PauliMode::Phase).unwrap();
        assert_eq!(outcome.samples().len(), samples);
        assert_eq!(outcome.failures(), 0);
        for sample in outcome.samples() {
            assert!(sample.frame.is_identity());
            assert_eq!(sample.frame.register(), &[false, false]);
        }
    }

    #[test]
    fn bad_noise_fails_the_batch() {
        let circuit =
            CliffordCircuit::new(1, 0, [CliffordInstruction::new(H(0)).noisy()]).unwrap();
        let noise = vec![vec![1], vec![2, 3], vec![0]];
        assert_eq!(
            propagate_all_samples(&circuit, &noise, PauliMode::Phase),
            Err(PropagationError::NoiseCountMismatch {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn sampled_noise_feeds_batches() {
        init_logging();
        let circuit = CliffordCircuit::random(6, 80, 3);
        let sampler = NoiseSampler::for_circuit(&circuit, 200, 11).unwrap();
        assert_eq!(sampler.channels(), circuit.noisy_instructions());
        for (&cardinality, arity) in sampler.cardinalities().iter().zip(circuit.noise_arities()) {
            assert_eq!(cardinality, 4u64.pow(arity as u32));
        }

        let outcome =
            propagate_all_samples(&circuit, sampler.draws(), PauliMode::Phase).unwrap();
        assert_eq!(outcome.samples().len(), 200);
        assert_eq!(outcome.failures(), 0);

        // Each sample is the same as propagating it on its own.
        for (sample, noise) in outcome.samples().iter().zip(sampler.draws()).take(10) {
            let mut f = PauliFrame::zero(6, 0);
            propagate(&mut f, &circuit, noise, PauliMode::Phase).unwrap();
            assert_eq!(sample.frame, f);
        }
    }

    #[test]
    fn from_codes() {
        let circuit = CliffordCircuit::from_codes(
            2,
            1,
            &[0, 1, 9, 3, 10],
            &[false, true, false, false, false],
            &[0, 0, 0, 1, 0],
            &[0, 0, 0, 1, 0],
            &[vec![], vec![], vec![], vec![0], vec![1, 3]],
            &[vec![0], vec![0, 1], vec![1], vec![0], vec![0]],
            &[vec![], vec![], vec![0], vec![], vec![]],
        )
        .unwrap();

        let expected = CliffordCircuit::new(
            2,
            1,
            [
                CliffordInstruction::new(H(0)),
                CliffordInstruction::new(Cx(0, 1)).noisy(),
                CliffordInstruction::new(FrameOp::MeasureReset { qubit: 1, cbit: 0 }),
                CliffordInstruction::new(X(0)).with_condition(Condition::equal(1, [0])),
                CliffordInstruction::new(FrameOp::Guard {
                    qubit: 0,
                    forbidden: vec![Pauli::X, Pauli::Y],
                }),
            ],
        )
        .unwrap();
        assert_eq!(circuit, expected);
    }

    #[test]
    fn from_codes_errors() {
        let one = |code: u8, mode: u8, bits: Vec<usize>, qargs: Vec<usize>| {
            CliffordCircuit::from_codes(
                2,
                1,
                &[code],
                &[false],
                &[0],
                &[mode],
                &[bits],
                &[qargs],
                &[vec![]],
            )
        };
        assert_eq!(
            one(8, 0, vec![], vec![0]),
            Err(CliffordCircuitError::UnknownGateCode {
                instruction: 0,
                code: 8
            })
        );
        assert_eq!(
            one(1, 0, vec![], vec![0]),
            Err(CliffordCircuitError::ArgumentCount {
                instruction: 0,
                code: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            one(0, 3, vec![], vec![0]),
            Err(CliffordCircuitError::InvalidCompareMode {
                instruction: 0,
                mode: 3
            })
        );
        assert_eq!(
            one(10, 0, vec![4], vec![0]),
            Err(CliffordCircuitError::InvalidPauliLabel {
                instruction: 0,
                label: 4
            })
        );
        assert_eq!(
            one(0, 1, vec![1], vec![0]),
            Err(CliffordCircuitError::InvalidCbitIndex {
                instruction: 0,
                gate: "h",
                index: 1,
                cbits: 1
            })
        );
        assert_eq!(
            one(9, 0, vec![], vec![0]),
            Err(CliffordCircuitError::ArgumentCount {
                instruction: 0,
                code: 9,
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn conditions_only_on_gates() {
        assert_eq!(
            CliffordCircuit::new(
                1,
                1,
                [CliffordInstruction::new(FrameOp::MeasureReset { qubit: 0, cbit: 0 })
                    .with_condition(Condition::equal(1, [0]))],
            ),
            Err(CliffordCircuitError::ConditionNotSupported {
                instruction: 0,
                gate: "measure_reset"
            })
        );
    }
}

#[cfg(feature = "python")]
#[test]
fn python() {
    use pyo3::{ffi::c_str, Python};

    pyo3::append_to_inittab!(python_module);
    Python::with_gil(|py| Python::run(py, c_str!(include_str!("test.py")), None, None).unwrap());
}
