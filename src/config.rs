use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};

use crate::kernel::{AmplitudeKernel, Parallel, Sequential};

/// How the amplitude pairs or quadruples touched by a single gate are iterated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Plain loop over explicit index arithmetic. Used as the reference implementation.
    Sequential,
    /// Data-parallel loop on the rayon thread pool.
    #[default]
    Parallel,
}
impl Strategy {
    pub fn kernel(self) -> &'static dyn AmplitudeKernel {
        match self {
            Strategy::Sequential => &Sequential,
            Strategy::Parallel => &Parallel,
        }
    }
}

/// What to do when a supplied amplitude vector does not have length `2^n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizePolicy {
    /// Reject the vector.
    #[default]
    Fail,
    /// Discard the vector and start from the zero state instead.
    Reinitialize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub strategy: Strategy,
    pub size_policy: SizePolicy,
}
impl RunOptions {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_size_policy(mut self, size_policy: SizePolicy) -> Self {
        self.size_policy = size_policy;
        self
    }
}

/// Build the global rayon thread pool used by the parallel kernels and batched propagation.
///
/// Uses one thread per logical CPU unless `threads` is given.
/// Fails if the global pool has already been initialized.
pub fn initialize_global(threads: Option<usize>) -> Result<(), ThreadPoolBuildError> {
    let threads = threads.unwrap_or_else(num_cpus::get);
    ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    log::info!("initialized global thread pool with {threads} threads");
    Ok(())
}
