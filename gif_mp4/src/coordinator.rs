//! Batch coordinator: Discover → Prepare → Dispatch/Collect → Report.
//!
//! Each phase completes before the next starts. Discover and Prepare can
//! abort the run with a [`BatchError`]; once tasks are dispatched every one
//! of them yields exactly one outcome and the run always reaches Report.

use crate::converter::Transcode;
use crate::task::{ConversionOutcome, ConversionTask, EncodingParameters};
use indicatif::ProgressBar;
use rayon::prelude::*;
use shared_utils::batch::{collect_files, BatchResult};
use shared_utils::errors::{BatchError, Result};
use shared_utils::progress::{create_hidden_progress_bar, create_progress_bar};
use shared_utils::report::print_summary_report;
use shared_utils::thread_manager::{default_worker_count, effective_worker_count};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const INPUT_EXTENSION: &str = "gif";
pub const OUTPUT_EXTENSION: &str = "mp4";

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub params: EncodingParameters,
    /// Pool size. Defaults to the host's logical CPU count.
    pub worker_count: usize,
    pub input_extension: String,
    pub output_extension: String,
}

impl BatchConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        input_dir: P,
        output_dir: Q,
        params: EncodingParameters,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            params,
            worker_count: default_worker_count(),
            input_extension: INPUT_EXTENSION.to_string(),
            output_extension: OUTPUT_EXTENSION.to_string(),
        }
    }

    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }
}

/// Everything the Report phase needs.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub result: BatchResult,
    pub output_dir: PathBuf,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn is_complete_success(&self) -> bool {
        self.result.is_complete_success()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.result.failed_names().collect()
    }

    /// 0 unless `strict` is set and something failed, in which case 2.
    pub fn exit_code(&self, strict: bool) -> u8 {
        if strict && !self.is_complete_success() {
            2
        } else {
            0
        }
    }

    pub fn print(&self) {
        info!(
            total = self.result.total,
            succeeded = self.result.succeeded,
            failed = self.result.failed(),
            elapsed_secs = self.elapsed.as_secs_f64(),
            "Batch finished"
        );
        print_summary_report(&self.result, self.elapsed, &self.output_dir, "MP4");
    }
}

pub struct BatchCoordinator<T: Transcode> {
    config: BatchConfig,
    converter: T,
    show_progress: bool,
}

impl<T: Transcode> BatchCoordinator<T> {
    pub fn new(config: BatchConfig, converter: T) -> Self {
        Self {
            config,
            converter,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(&self) -> Result<BatchReport> {
        let started = Instant::now();
        let sources = self.discover()?;
        let tasks = self.prepare(sources)?;
        let result = self.dispatch(&tasks)?;

        Ok(BatchReport {
            result,
            output_dir: self.config.output_dir.clone(),
            elapsed: started.elapsed(),
        })
    }

    /// Matching files directly inside the input directory (non-recursive).
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.input_dir;
        if !dir.exists() {
            return Err(BatchError::InputNotFound(dir.clone()));
        }
        if !dir.is_dir() {
            return Err(BatchError::NotADirectory(dir.clone()));
        }

        let extension = self.config.input_extension.as_str();
        let files = collect_files(dir, &[extension]);
        if files.is_empty() {
            return Err(BatchError::NoInputFiles {
                dir: dir.clone(),
                extension: extension.to_string(),
            });
        }

        info!(count = files.len(), dir = %dir.display(), "Discovered input files");
        println!(
            "📂 Found {} {}(s) in '{}'.",
            files.len(),
            extension.to_uppercase(),
            dir.display()
        );
        Ok(files)
    }

    /// Create the output directory, then build one task per source.
    ///
    /// Sources that map to the same destination are all kept; whichever
    /// worker finishes last owns the file. Each such collision is logged.
    pub fn prepare(&self, sources: Vec<PathBuf>) -> Result<Vec<ConversionTask>> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutputDir {
            dir: output_dir.clone(),
            source,
        })?;

        let tasks: Vec<ConversionTask> = sources
            .into_iter()
            .map(|source| {
                ConversionTask::new(
                    source,
                    output_dir,
                    &self.config.output_extension,
                    self.config.params,
                )
            })
            .collect();

        warn_on_collisions(&tasks);
        Ok(tasks)
    }

    /// Run every task on a fixed pool and collect outcomes as they arrive.
    ///
    /// Returns only after all workers have finished.
    pub fn dispatch(&self, tasks: &[ConversionTask]) -> Result<BatchResult> {
        let total = tasks.len() as u64;
        let pb = if self.show_progress {
            create_progress_bar(total, "Converting GIFs to MP4s")
        } else {
            create_hidden_progress_bar(total)
        };
        self.dispatch_with_progress(tasks, &pb)
    }

    /// [`dispatch`](Self::dispatch) reporting to a caller-owned bar, which
    /// advances by one per collected outcome.
    pub fn dispatch_with_progress(
        &self,
        tasks: &[ConversionTask],
        pb: &ProgressBar,
    ) -> Result<BatchResult> {
        let workers = effective_worker_count(self.config.worker_count, tasks.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gif-mp4-worker-{}", i))
            .build()
            .map_err(|e| BatchError::ThreadPool(e.to_string()))?;

        info!(
            "🔧 Converting {} file(s) with {} worker(s)",
            tasks.len(),
            workers
        );

        let (tx, rx) = mpsc::channel::<ConversionOutcome>();
        let converter = &self.converter;
        let mut result = BatchResult::new();

        thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    tasks.par_iter().for_each_with(tx, |tx, task| {
                        let _ = tx.send(execute(converter, task));
                    });
                });
            });

            // Ends once every worker's sender is dropped.
            for outcome in rx {
                pb.inc(1);
                pb.set_message(outcome.source_name.clone());
                match outcome.result {
                    Ok(()) => result.success(),
                    Err(e) => {
                        pb.suspend(|| {
                            warn!(
                                source = %outcome.source_name,
                                exit_code = ?e.exit_code(),
                                "Error converting {} to MP4: {}\n{}",
                                outcome.source_name,
                                e,
                                e.stderr()
                            )
                        });
                        result.fail(outcome.source_name, e.to_string());
                    }
                }
            }
        });

        pb.finish_and_clear();
        Ok(result)
    }
}

fn execute<T: Transcode + ?Sized>(converter: &T, task: &ConversionTask) -> ConversionOutcome {
    debug!(
        source = %task.source.display(),
        destination = %task.destination.display(),
        "Converting"
    );
    ConversionOutcome {
        source_name: task.source_name.clone(),
        result: converter.transcode(task),
    }
}

/// Destinations are compared case-folded, since `A.mp4` and `a.mp4` are
/// one file on case-insensitive filesystems.
fn warn_on_collisions(tasks: &[ConversionTask]) -> usize {
    let mut owners: HashMap<String, &ConversionTask> = HashMap::with_capacity(tasks.len());
    let mut collisions = 0;
    for task in tasks {
        let key = task.destination.to_string_lossy().to_lowercase();
        if let Some(first) = owners.insert(key, task) {
            collisions += 1;
            if first.destination == task.destination {
                warn!(
                    destination = %task.destination.display(),
                    "⚠️  '{}' and '{}' both convert to the same file; the last one to finish wins",
                    first.source_name,
                    task.source_name
                );
            } else {
                warn!(
                    destination = %task.destination.display(),
                    "⚠️  '{}' and '{}' convert to names that differ only by case; \
                     on a case-insensitive filesystem the last one to finish wins",
                    first.source_name,
                    task.source_name
                );
            }
        }
    }
    collisions
}
