//! Concurrent execution across entrypoints.
//!
//! Lifecycle calls are issued and awaited one at a time *per entrypoint*
//! but may run concurrently *across* entrypoints. The executor fans
//! builds out over a `JoinSet` with a `Semaphore` for bounded
//! parallelism, and merges results back in input order for determinism.
//!
//! Failure isolation: one entrypoint failing never corrupts or blocks its
//! siblings. Each slot in the returned vector carries its own `Result`.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::contract::{BuildOutcome, Builder};
use crate::error::{Error, Result};
use crate::options::BuildOptions;

/// Outcome of one entrypoint's build.
#[derive(Debug)]
pub struct EntrypointBuild {
    pub entrypoint: String,
    pub result: Result<BuildOutcome>,
}

/// Build every entrypoint, at most `max_parallel` at a time.
///
/// Results come back in input order. The shared `Files` snapshots inside
/// each `BuildOptions` are read-only; cloned handles are cheap and safe
/// to share across concurrently-running builds.
pub async fn execute_builds(
    builder: Builder,
    tasks: Vec<BuildOptions>,
    max_parallel: usize,
) -> Vec<EntrypointBuild> {
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let mut join_set = JoinSet::new();

    for (index, options) in tasks.into_iter().enumerate() {
        let builder = builder.clone();
        let semaphore = Arc::clone(&semaphore);

        join_set.spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("build semaphore closed while executor is running");
            let entrypoint = options.entrypoint.clone();
            let result = build_one(&builder, &options).await;
            (index, entrypoint, result)
        });
    }

    let mut slots: Vec<Option<EntrypointBuild>> = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        let (index, entrypoint, result) = match joined {
            Ok(value) => value,
            // A panic carries no slot index to report under; re-raise it.
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        };
        if slots.len() <= index {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(EntrypointBuild { entrypoint, result });
    }

    slots
        .into_iter()
        .map(|slot| slot.expect("every spawned build reports exactly once"))
        .collect()
}

async fn build_one(builder: &Builder, options: &BuildOptions) -> Result<BuildOutcome> {
    let outcome = builder.build(options).await?;

    if let BuildOutcome::V2(result) = &outcome {
        let missing = result.missing_prerender_fallbacks();
        if !missing.is_empty() {
            tracing::warn!(
                entrypoint = %options.entrypoint,
                fallbacks = ?missing,
                "prerender fallbacks are not present in the output mapping"
            );
        }
    }

    Ok(outcome)
}

impl EntrypointBuild {
    /// True when this entrypoint failed with a builder error (as opposed
    /// to a precondition or contract failure).
    pub fn is_builder_failure(&self) -> bool {
        matches!(self.result, Err(Error::BuilderFailed { .. }))
    }
}
