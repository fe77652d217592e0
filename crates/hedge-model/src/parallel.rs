//! Utilities for generating the workloads of several functions in parallel.

use std::sync::mpsc::channel;
use std::time::Instant;

use itertools::izip;
use log::info;
use threadpool::ThreadPool;

use crate::config::{ExperimentConfig, FunctionSpec};
use crate::error::{Error, Result};
use crate::generator::WorkloadGenerator;
use crate::hedge::HedgePolicy;
use crate::output::HedgeOutcome;

/// Generates the workload of a single function.
pub fn generate_function(
    spec: &FunctionSpec,
    policies: &[HedgePolicy],
    requests_count: usize,
    seed: u64,
) -> Result<Vec<HedgeOutcome>> {
    let start = Instant::now();
    info!("Running for function {}...", spec.name);
    let mut generator = WorkloadGenerator::new(spec, policies, seed)?;
    let rows = generator.generate(requests_count);
    info!(
        "Finished function {} ({}) in {:.2?}",
        spec.name,
        generator.app(),
        start.elapsed()
    );
    Ok(rows)
}

/// Generates all functions one by one, in configured order.
pub fn generate_sequential(config: &ExperimentConfig) -> Result<Vec<HedgeOutcome>> {
    let mut rows = Vec::new();
    for spec in config.functions.iter() {
        rows.extend(generate_function(
            spec,
            &config.hedges,
            config.requests_count,
            config.seed,
        )?);
    }
    Ok(rows)
}

/// Generates all functions in a thread pool with `n_workers` worker threads.
///
/// Each function is generated by a separate job with its own random streams, so the result is
/// identical to [`generate_sequential`].
pub fn generate_parallel(config: &ExperimentConfig, n_workers: usize) -> Result<Vec<HedgeOutcome>> {
    let len = config.functions.len();
    if len == 0 {
        return Ok(Vec::new());
    }
    let pool = ThreadPool::new(n_workers.clamp(1, len));
    let (tx, rx) = channel();
    for (id, spec) in izip!(0..len, config.functions.iter().cloned()) {
        let tx = tx.clone();
        let policies = config.hedges.clone();
        let requests_count = config.requests_count;
        let seed = config.seed;
        pool.execute(move || {
            let result = generate_function(&spec, &policies, requests_count, seed);
            // the receiver outlives the pool, sending can only fail if the caller is gone
            let _ = tx.send((id, result));
        });
    }
    drop(tx);
    let mut results: Vec<_> = rx.iter().take(len).collect();
    if results.len() != len {
        return Err(Error::Config("workload generation job panicked".to_string()));
    }
    results.sort_by_key(|x| x.0);
    let mut rows = Vec::new();
    for (_, result) in results.drain(..) {
        rows.extend(result?);
    }
    Ok(rows)
}
