//! Gate kernels acting in place on a dense amplitude slice.
//!
//! For a target qubit `q` the *stripe* is `2^q` and the *stride* is `2 * stripe`.
//! Amplitude `j` with bit `q` cleared pairs with `j + stripe`, and every such `j`
//! can be written as `outer * stride + inner` with `inner < stripe`.
//! Two-qubit kernels nest the lower qubit's stride inside the higher qubit's stride,
//! so they always order the qubits first.
//!
//! Both implementations assume that the slice has a power-of-two length
//! and that the qubit indices are valid and distinct; [`crate::StateVector`] checks this.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex;
use rayon::prelude::*;

use crate::circuit::Matrix2;

/// Slices shorter than this are not split further between threads.
const MIN_PARALLEL_LEN: usize = 1 << 12;

pub trait AmplitudeKernel: Sync {
    fn hadamard(&self, amps: &mut [Complex<f64>], q: usize);
    fn controlled_z(&self, amps: &mut [Complex<f64>], a: usize, b: usize);
    fn unitary1(&self, amps: &mut [Complex<f64>], u: &Matrix2, q: usize);
    fn diag2(&self, amps: &mut [Complex<f64>], modulator: &[Complex<f64>; 4], a: usize, b: usize);
}

/// Reference kernels iterating over explicit addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

/// Kernels that split the slice along stripes and hand the pieces to rayon.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallel;

/// Index of the amplitude that the `i`th pair starts at, for a gate on a qubit with the given stripe.
#[inline]
fn pair_index(i: usize, stripe: usize) -> usize {
    let stride = stripe << 1;
    (i / stripe) * stride + i % stripe
}

/// Index of the amplitude with both bits `lo` and `hi` cleared that the `i`th quadruple starts at.
#[inline]
fn quad_index(i: usize, lo: usize, hi: usize) -> usize {
    let stripe_lo = 1 << lo;
    let stride_lo = stripe_lo << 1;
    let stride_hi = 2 << hi;
    // Number of lower strides fitting in one higher stripe.
    let count_lo = 1 << (hi - lo - 1);

    let k = i % stripe_lo;
    let quot = i / stripe_lo;
    let j = quot % count_lo;
    let outer = quot / count_lo;
    outer * stride_hi + j * stride_lo + k
}

/// Index into a two-qubit modulator for the bit values of the lower and higher qubit,
/// where `a_is_lo` tells whether the modulator's first qubit is the lower one.
#[inline]
fn modulator_index(bit_lo: usize, bit_hi: usize, a_is_lo: bool) -> usize {
    if a_is_lo {
        bit_lo + 2 * bit_hi
    } else {
        bit_hi + 2 * bit_lo
    }
}

#[inline]
fn apply_matrix(u: &Matrix2, x: &mut Complex<f64>, y: &mut Complex<f64>) {
    let (old_x, old_y) = (*x, *y);
    *x = u[0][0] * old_x + u[0][1] * old_y;
    *y = u[1][0] * old_x + u[1][1] * old_y;
}

#[inline]
fn apply_hadamard(x: &mut Complex<f64>, y: &mut Complex<f64>) {
    let (old_x, old_y) = (*x, *y);
    *x = (old_x + old_y) * FRAC_1_SQRT_2;
    *y = (old_x - old_y) * FRAC_1_SQRT_2;
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    debug_assert_ne!(a, b);
    (a.min(b), a.max(b))
}

impl AmplitudeKernel for Sequential {
    fn hadamard(&self, amps: &mut [Complex<f64>], q: usize) {
        let stripe = 1 << q;
        for i in 0..amps.len() / 2 {
            let j = pair_index(i, stripe);
            let (lo, hi) = amps.split_at_mut(j + stripe);
            apply_hadamard(&mut lo[j], &mut hi[0]);
        }
    }

    fn controlled_z(&self, amps: &mut [Complex<f64>], a: usize, b: usize) {
        let (lo, hi) = ordered(a, b);
        let both = (1 << lo) | (1 << hi);
        for i in 0..amps.len() / 4 {
            let l = quad_index(i, lo, hi) + both;
            amps[l] = -amps[l];
        }
    }

    fn unitary1(&self, amps: &mut [Complex<f64>], u: &Matrix2, q: usize) {
        let stripe = 1 << q;
        for i in 0..amps.len() / 2 {
            let j = pair_index(i, stripe);
            let (lo, hi) = amps.split_at_mut(j + stripe);
            apply_matrix(u, &mut lo[j], &mut hi[0]);
        }
    }

    fn diag2(&self, amps: &mut [Complex<f64>], modulator: &[Complex<f64>; 4], a: usize, b: usize) {
        let (lo, hi) = ordered(a, b);
        let a_is_lo = a == lo;
        let stripe_lo = 1 << lo;
        let stripe_hi = 1 << hi;
        for i in 0..amps.len() / 4 {
            let base = quad_index(i, lo, hi);
            for (bit_lo, bit_hi) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let l = base + bit_lo * stripe_lo + bit_hi * stripe_hi;
                amps[l] *= modulator[modulator_index(bit_lo, bit_hi, a_is_lo)];
            }
        }
    }
}

impl Parallel {
    /// Run `f` on every amplitude pair `(j, j + stripe)` of a gate on qubit `q`.
    fn for_each_pair<F>(amps: &mut [Complex<f64>], q: usize, f: F)
    where
        F: Fn(&mut Complex<f64>, &mut Complex<f64>) + Sync,
    {
        let stripe = 1 << q;
        amps.par_chunks_mut(stripe << 1).for_each(|block| {
            let (zeros, ones) = block.split_at_mut(stripe);
            zeros
                .par_iter_mut()
                .zip(ones.par_iter_mut())
                .with_min_len(MIN_PARALLEL_LEN)
                .for_each(|(x, y)| f(x, y));
        });
    }

    /// Run `f` on each of the four sub-slices selected by the values of bits `lo < hi`,
    /// passing the bit values along.
    fn for_each_quadrant<F>(amps: &mut [Complex<f64>], lo: usize, hi: usize, f: F)
    where
        F: Fn(&mut [Complex<f64>], usize, usize) + Sync,
    {
        let stripe_lo = 1 << lo;
        let stripe_hi = 1 << hi;
        let split_lo = |half: &mut [Complex<f64>], bit_hi: usize| {
            half.par_chunks_mut(stripe_lo << 1).for_each(|block| {
                let (zeros, ones) = block.split_at_mut(stripe_lo);
                rayon::join(|| f(zeros, 0, bit_hi), || f(ones, 1, bit_hi));
            });
        };
        amps.par_chunks_mut(stripe_hi << 1).for_each(|block| {
            let (zeros, ones) = block.split_at_mut(stripe_hi);
            rayon::join(|| split_lo(zeros, 0), || split_lo(ones, 1));
        });
    }
}

impl AmplitudeKernel for Parallel {
    fn hadamard(&self, amps: &mut [Complex<f64>], q: usize) {
        Parallel::for_each_pair(amps, q, apply_hadamard);
    }

    fn controlled_z(&self, amps: &mut [Complex<f64>], a: usize, b: usize) {
        let (lo, hi) = ordered(a, b);
        Parallel::for_each_quadrant(amps, lo, hi, |slice, bit_lo, bit_hi| {
            if bit_lo == 1 && bit_hi == 1 {
                slice
                    .par_iter_mut()
                    .with_min_len(MIN_PARALLEL_LEN)
                    .for_each(|x| *x = -*x);
            }
        });
    }

    fn unitary1(&self, amps: &mut [Complex<f64>], u: &Matrix2, q: usize) {
        Parallel::for_each_pair(amps, q, |x, y| apply_matrix(u, x, y));
    }

    fn diag2(&self, amps: &mut [Complex<f64>], modulator: &[Complex<f64>; 4], a: usize, b: usize) {
        let (lo, hi) = ordered(a, b);
        let a_is_lo = a == lo;
        Parallel::for_each_quadrant(amps, lo, hi, |slice, bit_lo, bit_hi| {
            let factor = modulator[modulator_index(bit_lo, bit_hi, a_is_lo)];
            slice
                .par_iter_mut()
                .with_min_len(MIN_PARALLEL_LEN)
                .for_each(|x| *x *= factor);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_indices_have_target_bit_cleared() {
        for q in 0..4 {
            let stripe = 1 << q;
            let starts: Vec<usize> = (0..8).map(|i| pair_index(i, stripe)).collect();
            let expected: Vec<usize> = (0..16).filter(|j| j & stripe == 0).collect();
            assert_eq!(starts, expected, "q={q}");
        }
    }

    #[test]
    fn quad_indices_have_both_bits_cleared() {
        for hi in 1..5 {
            for lo in 0..hi {
                let mask = (1 << lo) | (1 << hi);
                let starts: Vec<usize> = (0..8).map(|i| quad_index(i, lo, hi)).collect();
                let expected: Vec<usize> = (0..32).filter(|j| j & mask == 0).collect();
                assert_eq!(starts, expected, "lo={lo} hi={hi}");
            }
        }
    }
}
