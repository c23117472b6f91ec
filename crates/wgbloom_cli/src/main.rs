use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use wgbloom_core::{
    block_shape, hash, BenchmarkApp, BloomBenchmark, BloomConfig, Corpus, HostDevice, LaunchConfig,
    RunOptions, RunSummary,
};
use wgbloom_core::bloom::BloomReport;
use wgbloom_core::consts::DEFAULT_MAX_WORK_GROUP_SIZE;

#[derive(Parser)]
#[command(name = "wgbloom", about = "Work-group Bloom filter benchmark")]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Insert, self-query and cross-query random corpora
    Run(RunArgs),

    /// Print the launch shape for a corpus
    Shape {
        #[arg(long)]
        words: usize,
        #[arg(long, default_value_t = 10)]
        hashes: usize,
        #[arg(long, default_value_t = DEFAULT_MAX_WORK_GROUP_SIZE)]
        max_work_group_size: usize,
    },

    /// Print the hashes and probe indices of one word
    Probe {
        #[arg(long)]
        word: String,
        #[arg(long)]
        size: usize,
        #[arg(long, default_value_t = 10)]
        hashes: usize,
    },

    /// Write the default configuration as JSON
    InitConfig {
        #[arg(long)]
        path: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// JSON config; flags given on the command line override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Filter size in bits
    #[arg(long)]
    size: Option<usize>,
    #[arg(long)]
    num_hashes: Option<usize>,
    /// Byte budget of the inserted corpus
    #[arg(long)]
    true_file_size: Option<usize>,
    /// Byte budget of the query corpus
    #[arg(long)]
    false_file_size: Option<usize>,
    #[arg(long)]
    num_runs: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    max_work_group_size: Option<usize>,
    #[arg(long)]
    local_mem_size: Option<usize>,
    #[arg(long)]
    threads: Option<usize>,
    /// Write the final filter as '0'/'1' characters
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    no_verification: bool,
    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl RunArgs {
    fn into_config(self) -> Result<(BloomConfig, bool)> {
        let mut cfg = match &self.config {
            Some(p) => BloomConfig::load(p)?,
            None => BloomConfig::default(),
        };
        if let Some(v) = self.size { cfg.size = v; }
        if let Some(v) = self.num_hashes { cfg.num_hashes = v; }
        if let Some(v) = self.true_file_size { cfg.true_file_size = v; }
        if let Some(v) = self.false_file_size { cfg.false_file_size = v; }
        if let Some(v) = self.num_runs { cfg.num_runs = v; }
        if let Some(v) = self.seed { cfg.seed = Some(v); }
        if let Some(v) = self.max_work_group_size { cfg.device.max_work_group_size = v; }
        if let Some(v) = self.local_mem_size { cfg.device.local_mem_size = v; }
        if let Some(v) = self.threads { cfg.device.threads = Some(v); }
        if self.output.is_some() { cfg.output = self.output; }
        if self.no_verification { cfg.verify = false; }
        cfg.validate()?;
        Ok((cfg, self.json))
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &RunSummary<BloomReport>) {
    for run in &summary.runs {
        let r = &run.report;
        println!("run {}: {:.3} ms", run.index, run.elapsed_ms);
        for e in &run.events {
            let state = if e.is_complete() { "ok" } else { "skipped" };
            println!("  {:<12} {:>8.3} ms  {}", e.name, e.elapsed_ms, state);
        }
        println!("num_true: {}, num_false: {}", r.num_true, r.num_false);
        println!(
            "filter: {}/{} bits set  digest={}",
            r.filter_bits_set, r.filter_bits, r.filter_digest
        );
    }
    println!(
        "time: min={:.3} ms mean={:.3} ms max={:.3} ms",
        summary.min_ms, summary.mean_ms, summary.max_ms
    );
    println!("verification: {}", if summary.verified() { "PASS" } else { "FAIL" });
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Cmd::Run(args) => {
            let (cfg, json) = args.into_config()?;
            if !json {
                print!("{}", cfg.show_details());
            }
            let device = HostDevice::new(cfg.device)?;
            let app = BenchmarkApp::new(device, RunOptions::from(&cfg));
            let summary = app.run::<BloomBenchmark>(&cfg)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            if !summary.verified() {
                return Err(anyhow!("verification failed"));
            }
        }
        Cmd::Shape { words, hashes, max_work_group_size } => {
            let block = block_shape(words, hashes, max_work_group_size);
            println!("block: {} x {}", block.rows, block.cols);
            match LaunchConfig::for_words(words, hashes, max_work_group_size) {
                Ok(l) => {
                    println!("grid: {} x {}", l.grid.rows, l.grid.cols);
                    println!("groups: {}", l.num_groups());
                    println!("scratch: {} bytes", l.scratch_bytes);
                }
                Err(e) => println!("no dispatch: {e}"),
            }
        }
        Cmd::Probe { word, size, hashes } => {
            if size == 0 {
                return Err(anyhow!("--size must be non-zero"));
            }
            let corpus = Corpus::from_words(&[word.as_bytes()])?;
            let (h1, h2) = hash::hash_pair(corpus.bytes(), 0, size);
            println!("djb2: {}", hash::djb2(corpus.bytes(), 0));
            println!("sdbm: {}", hash::sdbm(corpus.bytes(), 0));
            println!("h1: {h1}  h2: {h2}");
            let probes = hash::probes(corpus.bytes(), 0, size, hashes);
            println!("probes: {:?}", probes);
        }
        Cmd::InitConfig { path } => {
            BloomConfig::default().save(&path)?;
            println!("config written: {}", path.display());
        }
    }
    Ok(())
}
