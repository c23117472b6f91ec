//! Benchmark harness: `setup -> run -> verify` repeated `num_runs` times.
use crate::config::BloomConfig;
use crate::device::Device;
use crate::errors::Result;
use crate::queue::{Event, Queue};
use serde::Serialize;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;

pub trait Benchmark: Sized {
    type Args;
    type Report: Serialize;

    fn name() -> &'static str;
    /// Host-side preparation; not timed.
    fn setup(args: &Self::Args) -> Result<Self>;
    /// Submits the device work; timed.
    fn run<D: Device>(&mut self, queue: &mut Queue<'_, D>) -> Result<()>;
    fn verify(&self) -> Result<bool>;
    fn report(&self) -> Self::Report;
    /// Runs after verification, e.g. to persist results.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub num_runs: usize,
    pub verify: bool,
}

impl From<&BloomConfig> for RunOptions {
    fn from(cfg: &BloomConfig) -> Self {
        Self { num_runs: cfg.num_runs, verify: cfg.verify }
    }
}

#[derive(Debug, Serialize)]
pub struct RunRecord<R> {
    pub index: usize,
    pub elapsed_ms: f64,
    /// `None` when verification was disabled.
    pub verified: Option<bool>,
    pub events: Vec<Event>,
    pub report: R,
}

#[derive(Debug, Serialize)]
pub struct RunSummary<R> {
    pub benchmark: &'static str,
    pub started_at: String,
    pub runs: Vec<RunRecord<R>>,
    pub min_ms: f64,
    pub mean_ms: f64,
    pub max_ms: f64,
}

impl<R> RunSummary<R> {
    /// False if any verified run failed.
    pub fn verified(&self) -> bool {
        self.runs.iter().all(|r| r.verified != Some(false))
    }

    pub fn last_report(&self) -> Option<&R> {
        self.runs.last().map(|r| &r.report)
    }
}

pub struct BenchmarkApp<D: Device> {
    device: D,
    options: RunOptions,
}

impl<D: Device> BenchmarkApp<D> {
    pub fn new(device: D, options: RunOptions) -> Self {
        Self { device, options }
    }

    pub fn device(&self) -> &D { &self.device }

    pub fn run<B: Benchmark>(&self, args: &B::Args) -> Result<RunSummary<B::Report>> {
        let started_at = time::OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let mut runs = Vec::with_capacity(self.options.num_runs);
        for index in 0..self.options.num_runs {
            let mut bench = B::setup(args)?;
            let mut queue = Queue::new(&self.device);
            let start = Instant::now();
            bench.run(&mut queue)?;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;
            let verified = if self.options.verify { Some(bench.verify()?) } else { None };
            bench.finish()?;
            tracing::info!(benchmark = B::name(), run = index, elapsed_ms, ?verified, "run complete");
            if verified == Some(false) {
                tracing::warn!(benchmark = B::name(), run = index, "verification failed");
            }
            runs.push(RunRecord {
                index,
                elapsed_ms,
                verified,
                events: queue.into_events(),
                report: bench.report(),
            });
        }
        let times: Vec<f64> = runs.iter().map(|r| r.elapsed_ms).collect();
        let n = times.len().max(1) as f64;
        let min_ms = if times.is_empty() { 0.0 } else { times.iter().copied().fold(f64::INFINITY, f64::min) };
        Ok(RunSummary {
            benchmark: B::name(),
            started_at,
            min_ms,
            mean_ms: times.iter().sum::<f64>() / n,
            max_ms: times.iter().copied().fold(0.0, f64::max),
            runs,
        })
    }
}
