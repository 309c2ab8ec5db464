//! Concurrent verification of independent spend proofs during block validation.
//!
//! Each submitted task is a side-effect-free closure over immutable inputs (a proof, an
//! accumulator snapshot captured for the batch, metadata) returning a verification result,
//! so tasks never contend and the proof verifiers need no locking. The caller thread blocks
//! in [`SpendBatchVerifier::wait`], the batch's single join point. Ledger mutation for the
//! block must start only after `wait` returns `Ok`.
//!
//! Cancellation (node shutdown, reorg) is cooperative: the flag is observed between tasks,
//! never inside a proof verification, and a batch can also simply be dropped since nothing
//! in it has side effects.

use crate::error::CoinSpendError;
use ark_std::mem;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type VerificationTask = Box<dyn FnOnce() -> Result<(), CoinSpendError> + Send>;

/// Signals an in-flight batch to stop picking up new tasks. Cloneable and sendable to
/// whatever thread handles shutdown.
#[derive(Clone, Debug, Default)]
pub struct CancellationHandle(Arc<AtomicBool>);

impl CancellationHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bounded-concurrency batch verifier. Tasks run on the rayon pool when the `parallel`
/// feature is on, sequentially otherwise; either way [`Self::wait`] reports the first
/// failure in submission order, independent of completion order.
#[derive(Default)]
pub struct SpendBatchVerifier {
    tasks: Vec<VerificationTask>,
    cancelled: CancellationHandle,
}

impl SpendBatchVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one independent, side-effect-free verification.
    pub fn submit(&mut self, task: impl FnOnce() -> Result<(), CoinSpendError> + Send + 'static) {
        self.tasks.push(Box::new(task));
    }

    pub fn cancel_handle(&self) -> CancellationHandle {
        self.cancelled.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run all submitted tasks and block until they finish. Every task runs to completion
    /// (or is skipped with `BatchCancelled` if the flag was raised before it started); the
    /// result is the first `Err` in submission order, so callers see a deterministic
    /// outcome regardless of scheduling.
    pub fn wait(&mut self) -> Result<(), CoinSpendError> {
        let tasks = mem::take(&mut self.tasks);
        let cancelled = self.cancelled.clone();

        let run = move |task: VerificationTask| {
            // Cancellation is observed between tasks only, never mid-proof
            if cancelled.is_cancelled() {
                Err(CoinSpendError::BatchCancelled)
            } else {
                task()
            }
        };

        #[cfg(feature = "parallel")]
        let results: Vec<Result<(), CoinSpendError>> =
            tasks.into_par_iter().map(run).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<Result<(), CoinSpendError>> = tasks.into_iter().map(run).collect();

        for result in results {
            result?;
        }
        Ok(())
    }

    /// Discard pending tasks and clear the cancellation flag, readying the verifier for the
    /// next batch.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.cancelled = CancellationHandle::default();
    }
}
