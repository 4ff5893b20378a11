use std::{collections::BTreeMap, error::Error, fmt::Display};

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::clifford_circuit::CliffordCircuit;

/// Uniformly drawn noise indices for a number of shots over a fixed set of channels.
///
/// Channel `c` has `cardinalities[c]` possible outcomes.
/// Every shot draws one outcome per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseSampler {
    cardinalities: Vec<u64>,
    /// One row of channel outcomes per shot.
    draws: Vec<Vec<u64>>,
}
impl NoiseSampler {
    pub fn sample(cardinalities: &[u64], shots: usize, seed: u64) -> Result<Self, NoiseError> {
        if let Some(channel) = cardinalities.iter().position(|&c| c == 0) {
            return Err(NoiseError::EmptyChannel { channel });
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let draws = (0..shots)
            .map(|_| {
                cardinalities
                    .iter()
                    .map(|&c| rng.random_range(0..c))
                    .collect()
            })
            .collect();
        log::debug!(
            "drew {shots} shots over {} noise channels",
            cardinalities.len()
        );
        Ok(NoiseSampler {
            cardinalities: cardinalities.to_vec(),
            draws,
        })
    }

    /// Sample noise for every noisy instruction of `circuit`.
    ///
    /// An instruction on `k` qubits is a channel with `4^k` outcomes, one per Pauli string,
    /// so every shot can be passed to [`crate::propagate`] as it is.
    pub fn for_circuit(
        circuit: &CliffordCircuit,
        shots: usize,
        seed: u64,
    ) -> Result<Self, NoiseError> {
        let cardinalities = circuit
            .noise_arities()
            .enumerate()
            .map(|(channel, k)| {
                u32::try_from(k)
                    .ok()
                    .and_then(|k| 4u64.checked_pow(k))
                    .ok_or(NoiseError::ChannelTooLarge { channel, qubits: k })
            })
            .collect::<Result<Vec<_>, _>>()?;
        NoiseSampler::sample(&cardinalities, shots, seed)
    }

    pub fn channels(&self) -> usize {
        self.cardinalities.len()
    }

    pub fn cardinalities(&self) -> &[u64] {
        &self.cardinalities
    }

    pub fn shots(&self) -> usize {
        self.draws.len()
    }

    /// The drawn outcomes, one row per shot.
    pub fn draws(&self) -> &[Vec<u64>] {
        &self.draws
    }

    pub fn into_draws(self) -> Vec<Vec<u64>> {
        self.draws
    }

    /// How often each full pattern of channel outcomes was drawn.
    pub fn stats(&self) -> BTreeMap<Vec<u64>, usize> {
        let mut stats = BTreeMap::new();
        for draw in &self.draws {
            *stats.entry(draw.clone()).or_insert(0) += 1;
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoiseError {
    EmptyChannel { channel: usize },
    ChannelTooLarge { channel: usize, qubits: usize },
}
impl Display for NoiseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseError::EmptyChannel { channel } => {
                write!(f, "Noise channel {channel} has no outcomes")
            }
            NoiseError::ChannelTooLarge { channel, qubits } => write!(
                f,
                "Noise channel {channel} on {qubits} qubits has too many outcomes"
            ),
        }
    }
}
impl Error for NoiseError {}
