// src/batch.rs
//! Directory batch driver: decode, filter, encode every matching file

use crate::codec::{AudioCodec, WavCodec};
use crate::config::{BandlimitConfig, BatchConfig};
use crate::error::{BandlimitErrorBuilder, BandlimitResult, ErrorKind};
use crate::processing::{FilterSpec, SignalPipeline};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// One input directory and where its filtered files go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl BatchJob {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }
}

/// A file that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub input: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.written.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded() + self.failed()
    }

    fn merge(&mut self, other: BatchSummary) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }
}

/// A job whose directories could not be listed or created
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub input_dir: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of several jobs
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub jobs: Vec<(PathBuf, BatchSummary)>,
    /// Input directories that did not exist
    pub skipped: Vec<PathBuf>,
    pub failed_jobs: Vec<JobFailure>,
}

impl BatchReport {
    pub fn totals(&self) -> BatchSummary {
        let mut totals = BatchSummary::default();
        for (_, summary) in &self.jobs {
            totals.merge(summary.clone());
        }
        totals
    }
}

/// Applies one [`FilterSpec`] to whole directories on a rayon pool
pub struct BatchProcessor {
    config: BatchConfig,
    codec: WavCodec,
    pipeline: SignalPipeline,
    spec: FilterSpec,
    pool: rayon::ThreadPool,
}

impl BatchProcessor {
    /// Build from the `[batch]`, `[codec]` and `[filter]` sections
    pub fn new(config: &BandlimitConfig) -> BandlimitResult<Self> {
        Self::with_spec(config, config.filter.to_spec())
    }

    /// Build with an explicit filter spec instead of `[filter]`
    pub fn with_spec(config: &BandlimitConfig, spec: FilterSpec) -> BandlimitResult<Self> {
        spec.validate().map_err(|e| {
            BandlimitErrorBuilder::new("batch", "new").invalid_input("filter_spec", e.to_string())
        })?;

        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("bandlimit-batch-{}", i));
        if config.batch.worker_threads > 0 {
            builder = builder.num_threads(config.batch.worker_threads);
        }
        let pool = builder.build().map_err(|e| {
            BandlimitErrorBuilder::new("batch", "new").configuration(format!("Failed to create thread pool: {}", e))
        })?;

        Ok(Self {
            config: config.batch.clone(),
            codec: WavCodec::from_config(&config.codec),
            pipeline: SignalPipeline::from_config(config),
            spec,
            pool,
        })
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Matching files directly inside `input_dir`, sorted by name
    pub fn collect_inputs(&self, input_dir: &Path) -> BandlimitResult<Vec<PathBuf>> {
        let io_error = |e| BandlimitErrorBuilder::new("batch", "collect_inputs").io(input_dir, e);

        let mut inputs = Vec::new();
        for entry in std::fs::read_dir(input_dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let matches = path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| self.config.accepts_extension(ext));
            if matches {
                inputs.push(path);
            }
        }

        inputs.sort();
        Ok(inputs)
    }

    /// `{stem}{suffix}.{ext}` inside `output_dir`
    pub fn output_path(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        let mut name = format!("{}{}", stem, self.config.output_suffix);
        if let Some(ext) = input.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
        output_dir.join(name)
    }

    /// Decode, filter and encode a single file
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> BandlimitResult<PathBuf> {
        let bytes = std::fs::read(input).map_err(|e| BandlimitErrorBuilder::new("batch", "read").io(input, e))?;

        let buffer = self.codec.decode(&bytes)?;
        let filtered = self.pipeline.batch_process(&buffer, &self.spec)?;
        let encoded = self.codec.encode(&filtered)?;

        let output = self.output_path(input, output_dir);
        std::fs::write(&output, encoded).map_err(|e| BandlimitErrorBuilder::new("batch", "write").io(&output, e))?;
        Ok(output)
    }

    /// Process every matching file of `input_dir`
    ///
    /// Per-file failures are collected in the summary. With
    /// `continue_on_error = false` the first failure aborts the run instead;
    /// files already in flight on other workers still complete.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> BandlimitResult<BatchSummary> {
        let inputs = self.prepare(input_dir, output_dir)?;
        self.process_inputs(input_dir, &inputs, output_dir)
    }

    /// Matching inputs, with `output_dir` created when there is anything to write
    fn prepare(&self, input_dir: &Path, output_dir: &Path) -> BandlimitResult<Vec<PathBuf>> {
        let inputs = self.collect_inputs(input_dir)?;
        if !inputs.is_empty() {
            std::fs::create_dir_all(output_dir)
                .map_err(|e| BandlimitErrorBuilder::new("batch", "create_output_dir").io(output_dir, e))?;
        }
        Ok(inputs)
    }

    fn process_inputs(&self, input_dir: &Path, inputs: &[PathBuf], output_dir: &Path) -> BandlimitResult<BatchSummary> {
        if inputs.is_empty() {
            info!(dir = %input_dir.display(), "no matching files");
            return Ok(BatchSummary::default());
        }

        info!(
            dir = %input_dir.display(),
            files = inputs.len(),
            highpass_hz = ?self.spec.highpass_hz,
            lowpass_hz = ?self.spec.lowpass_hz,
            "processing directory"
        );

        if !self.config.continue_on_error {
            let written = self.pool.install(|| {
                inputs
                    .par_iter()
                    .map(|input| self.process_file(input, output_dir))
                    .collect::<BandlimitResult<Vec<_>>>()
            })?;
            return Ok(BatchSummary { written, failures: Vec::new() });
        }

        let outcomes: Vec<(PathBuf, BandlimitResult<PathBuf>)> = self.pool.install(|| {
            inputs
                .par_iter()
                .map(|input| (input.clone(), self.process_file(input, output_dir)))
                .collect()
        });

        let mut summary = BatchSummary::default();
        for (input, outcome) in outcomes {
            match outcome {
                Ok(output) => summary.written.push(output),
                Err(e) => {
                    error!(file = %input.display(), error = %e, "failed to process file");
                    summary.failures.push(FileFailure {
                        input,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            dir = %input_dir.display(),
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "directory finished"
        );
        Ok(summary)
    }

    /// Run several jobs in order
    ///
    /// Missing input directories are skipped. A job whose directories cannot be
    /// read or created is recorded in `failed_jobs` and the next job still runs;
    /// only a failing file under `continue_on_error = false` ends the whole run.
    pub fn run_jobs(&self, jobs: &[BatchJob]) -> BandlimitResult<BatchReport> {
        let mut report = BatchReport::default();
        for job in jobs {
            if !job.input_dir.is_dir() {
                warn!(dir = %job.input_dir.display(), "input directory not found, skipping");
                report.skipped.push(job.input_dir.clone());
                continue;
            }
            let inputs = match self.prepare(&job.input_dir, &job.output_dir) {
                Ok(inputs) => inputs,
                Err(e) => {
                    error!(dir = %job.input_dir.display(), error = %e, "job failed before processing");
                    report.failed_jobs.push(JobFailure {
                        input_dir: job.input_dir.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let summary = self.process_inputs(&job.input_dir, &inputs, &job.output_dir)?;
            report.jobs.push((job.input_dir.clone(), summary));
        }
        Ok(report)
    }
}
