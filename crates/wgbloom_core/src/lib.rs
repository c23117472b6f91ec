pub mod consts;
pub mod errors;
pub mod hash;
pub mod corpus;
pub mod grid;
pub mod filter;
pub mod device;
pub mod kernels;
pub mod queue;
pub mod config;
pub mod bench;
pub mod bloom;

pub use bench::{Benchmark, BenchmarkApp, RunOptions, RunSummary};
pub use bloom::{BloomBenchmark, BloomReport};
pub use config::BloomConfig;
pub use corpus::{word_positions, Corpus};
pub use device::{Device, DeviceLimits, HostDevice, WorkGroupKernel, WorkItem};
pub use errors::{BloomError, Result};
pub use filter::DeviceFilter;
pub use grid::{block_shape, LaunchConfig, Range2};
pub use kernels::{InsertKernel, QueryKernel, QueryResults};
pub use queue::{Event, EventStatus, Queue};
