//! Batch generation across a fixed pool of blocking workers.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::task::JoinSet;

use crate::artifact::synthesize;
use crate::error::GenError;
use crate::extract::{classify_methods, extract_entity_type};
use crate::model::{ContractDescriptor, EntityDescriptor, ExistingImpl, SourceIndex};
use crate::scan::ContractLocator;
use crate::sink::ArtifactSink;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

const GENERATED_SUFFIX: &str = "ProxyImpl";

/// Contiguous slice of the deduplicated contract list handled by one worker.
pub type BuildTask = Range<usize>;

#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Scanned `src/` directory; artifacts are written below it.
    pub src_root: PathBuf,
    pub workers: usize,
    /// Upper bound on waiting for in-flight workers after a failure.
    pub shutdown_timeout: Duration,
}

impl BuildConfig {
    pub fn new(src_root: impl Into<PathBuf>) -> Self {
        Self {
            src_root: src_root.into(),
            workers: DEFAULT_WORKERS,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new("src")
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Contracts whose artifacts were submitted.
    pub generated: Vec<String>,
    /// Contracts without an output module.
    pub skipped: Vec<String>,
    /// Contracts already implemented in the source tree.
    pub excluded: Vec<String>,
    pub tasks: usize,
}

/// Drops contracts that are already implemented.
///
/// A contract is excluded when its own name ends in `ProxyImpl`, or when an
/// existing type's method names equal the contract's base plus declared
/// method names.
pub fn dedup(
    contracts: Vec<ContractDescriptor>,
    existing: &[ExistingImpl],
) -> (Vec<ContractDescriptor>, Vec<String>) {
    let mut kept = Vec::with_capacity(contracts.len());
    let mut excluded = Vec::new();
    for contract in contracts {
        let names = contract.method_names();
        let implemented = contract.name.ends_with(GENERATED_SUFFIX)
            || existing.iter().any(|imp| imp.methods == names);
        if implemented {
            tracing::debug!(contract = %contract.name, "contract already implemented");
            excluded.push(contract.name);
        } else {
            kept.push(contract);
        }
    }
    (kept, excluded)
}

/// Splits `len` items into contiguous ranges, one per worker.
///
/// The last range absorbs the remainder; with fewer items than workers every
/// range holds one item.
pub fn partition(len: usize, workers: usize) -> Vec<BuildTask> {
    if len == 0 {
        return Vec::new();
    }
    let workers = workers.max(1);
    if len < workers {
        return (0..len).map(|i| i..i + 1).collect();
    }
    let share = len / workers;
    (0..workers)
        .map(|i| {
            let start = i * share;
            let end = if i + 1 == workers { len } else { start + share };
            start..end
        })
        .collect()
}

#[derive(Debug, Default)]
struct WorkerOutcome {
    generated: Vec<String>,
    skipped: Vec<String>,
}

fn build_contract(
    contract: &ContractDescriptor,
    output: &str,
    entities: &[EntityDescriptor],
    sink: &dyn ArtifactSink,
    output_root: &Path,
) -> Result<(), GenError> {
    let entity = extract_entity_type(contract, entities)?;
    let methods = classify_methods(contract)?;
    let artifacts = synthesize(contract, entity, &methods, output)?;
    for artifact in artifacts.iter() {
        sink.submit(artifact, output_root)?;
    }
    Ok(())
}

fn run_worker(
    contracts: &[ContractDescriptor],
    entities: &[EntityDescriptor],
    sink: &dyn ArtifactSink,
    output_root: &Path,
    failed: &AtomicBool,
) -> Result<WorkerOutcome, GenError> {
    let mut outcome = WorkerOutcome::default();
    for contract in contracts {
        if failed.load(Ordering::Acquire) {
            break;
        }
        let Some(output) = contract.output.as_deref() else {
            println!(
                "[WARN] {} has no output module configured; skipping",
                contract.name
            );
            outcome.skipped.push(contract.name.clone());
            continue;
        };
        if let Err(err) = build_contract(contract, output, entities, sink, output_root) {
            failed.store(true, Ordering::Release);
            tracing::error!(contract = %contract.name, error = %err, "generation failed");
            return Err(err);
        }
        outcome.generated.push(contract.name.clone());
    }
    Ok(outcome)
}

/// Discovers contracts and generates their artifacts in parallel.
pub struct BuildOrchestrator<K> {
    config: BuildConfig,
    sink: Arc<K>,
}

impl<K> BuildOrchestrator<K>
where
    K: ArtifactSink + 'static,
{
    pub fn new(config: BuildConfig, sink: K) -> Self {
        Self {
            config,
            sink: Arc::new(sink),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Scans `src_root` and builds everything found there.
    pub async fn run(&self) -> Result<BuildReport, GenError> {
        let index = ContractLocator::new(&self.config.src_root).locate()?;
        self.run_index(index).await
    }

    /// Builds from an already collected index.
    pub async fn run_index(&self, index: SourceIndex) -> Result<BuildReport, GenError> {
        let start = Instant::now();
        let (contracts, excluded) = dedup(index.contracts, &index.existing);
        let mut report = BuildReport {
            excluded,
            ..BuildReport::default()
        };
        if contracts.is_empty() {
            println!("[INFO] No contracts to generate.");
            return Ok(report);
        }

        let ranges = partition(contracts.len(), self.config.workers);
        report.tasks = ranges.len();
        println!("[INFO] Build tasks: {}", ranges.len());

        let contracts = Arc::new(contracts);
        let entities = Arc::new(index.entities);
        let failed = Arc::new(AtomicBool::new(false));
        let output_root = Arc::new(self.config.src_root.clone());
        let mut workers = JoinSet::new();

        for range in ranges {
            println!("[INFO]   {} - {}", range.start, range.end - 1);
            let contracts = Arc::clone(&contracts);
            let entities = Arc::clone(&entities);
            let failed = Arc::clone(&failed);
            let output_root = Arc::clone(&output_root);
            let sink = Arc::clone(&self.sink);
            workers.spawn_blocking(move || {
                run_worker(
                    &contracts[range],
                    &entities,
                    sink.as_ref(),
                    &output_root,
                    &failed,
                )
            });
        }

        let mut first_error = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(outcome)) => {
                    report.generated.extend(outcome.generated);
                    report.skipped.extend(outcome.skipped);
                }
                Ok(Err(err)) => {
                    first_error = Some(err);
                    break;
                }
                Err(join_err) => {
                    failed.store(true, Ordering::Release);
                    first_error = Some(GenError::Worker(join_err.to_string()));
                    break;
                }
            }
        }

        if let Some(err) = first_error {
            let drain = async { while workers.join_next().await.is_some() {} };
            if tokio::time::timeout(self.config.shutdown_timeout, drain)
                .await
                .is_err()
            {
                tracing::warn!(
                    timeout = ?self.config.shutdown_timeout,
                    "workers still running after failure"
                );
                workers.detach_all();
            }
            return Err(err);
        }

        println!(
            "[OK] Generated {} contract(s) in {:.2?}",
            report.generated.len(),
            start.elapsed()
        );
        Ok(report)
    }

    /// Runs on a dedicated runtime; for build scripts and other sync callers.
    pub fn run_blocking(&self) -> Result<BuildReport, GenError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.config.workers.max(1))
            .enable_all()
            .build()
            .map_err(|err| GenError::io(&self.config.src_root, err))?;
        runtime.block_on(self.run())
    }
}
