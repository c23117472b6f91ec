//! Work-group device abstraction and the rayon-backed host device.
//!
//! A kernel runs in two phases per group: [`WorkGroupKernel::stage`] for every
//! work item, then the group barrier, then [`WorkGroupKernel::compute`] for
//! every work item. Groups run in parallel and never synchronize with each
//! other. Scratch memory is private to a group and lives for one dispatch.
use crate::consts::{DEFAULT_LOCAL_MEM_SIZE, DEFAULT_MAX_WORK_GROUP_SIZE};
use crate::errors::{BloomError, Result};
use crate::grid::{LaunchConfig, Range2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLimits {
    pub max_work_group_size: usize,
    /// Bytes of group-local memory.
    pub local_mem_size: usize,
    /// Worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_work_group_size: DEFAULT_MAX_WORK_GROUP_SIZE,
            local_mem_size: DEFAULT_LOCAL_MEM_SIZE,
            threads: None,
        }
    }
}

/// Position of one work item inside the launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkItem {
    /// Group index along the word dimension.
    pub group: usize,
    pub row: usize,
    pub col: usize,
    pub block: Range2,
}

impl WorkItem {
    /// Global index along the word dimension.
    #[inline]
    pub fn global_col(&self) -> usize { self.block.cols * self.group + self.col }

    /// Global column of the first item in this item's group.
    #[inline]
    pub fn group_start(&self) -> usize { self.block.cols * self.group }
}

pub trait WorkGroupKernel: Sync {
    /// Before the barrier; may write group scratch.
    fn stage(&self, item: &WorkItem, scratch: &mut [u8]);
    /// After the barrier; scratch is read-only.
    fn compute(&self, item: &WorkItem, scratch: &[u8]);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub groups: usize,
    pub work_items: usize,
}

pub trait Device {
    fn limits(&self) -> &DeviceLimits;
    fn dispatch<K: WorkGroupKernel>(&self, launch: &LaunchConfig, kernel: &K) -> Result<DispatchStats>;

    /// Rejects launches this device cannot run.
    fn check_launch(&self, launch: &LaunchConfig) -> Result<()> {
        let limits = self.limits();
        if launch.block.is_degenerate() || launch.grid.rows != launch.block.rows {
            return Err(BloomError::Launch(format!(
                "grid {:?} does not tile block {:?}",
                launch.grid, launch.block
            )));
        }
        if launch.grid.cols % launch.block.cols != 0 {
            return Err(BloomError::Launch(format!(
                "grid width {} is not a multiple of block width {}",
                launch.grid.cols, launch.block.cols
            )));
        }
        if launch.block.size() > limits.max_work_group_size {
            return Err(BloomError::Launch(format!(
                "block of {} work items exceeds group size {}",
                launch.block.size(),
                limits.max_work_group_size
            )));
        }
        if launch.scratch_bytes > limits.local_mem_size {
            return Err(BloomError::Capacity {
                what: "block scratch",
                needed: launch.scratch_bytes,
                available: limits.local_mem_size,
            });
        }
        Ok(())
    }
}

pub struct HostDevice {
    limits: DeviceLimits,
    pool: Option<rayon::ThreadPool>,
}

impl HostDevice {
    pub fn new(limits: DeviceLimits) -> Result<Self> {
        let pool = match limits.threads {
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };
        Ok(Self { limits, pool })
    }
}

impl Device for HostDevice {
    fn limits(&self) -> &DeviceLimits { &self.limits }

    fn dispatch<K: WorkGroupKernel>(&self, launch: &LaunchConfig, kernel: &K) -> Result<DispatchStats> {
        self.check_launch(launch)?;
        let groups = launch.num_groups();
        tracing::debug!(grid = ?launch.grid, block = ?launch.block, groups, "dispatch");
        let run = || {
            (0..groups)
                .into_par_iter()
                .for_each(|group| run_group(launch, group, kernel));
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
        Ok(DispatchStats { groups, work_items: launch.grid.size() })
    }
}

fn group_items(block: Range2, group: usize) -> impl Iterator<Item = WorkItem> {
    (0..block.cols).flat_map(move |col| {
        (0..block.rows).map(move |row| WorkItem { group, row, col, block })
    })
}

fn run_group<K: WorkGroupKernel>(launch: &LaunchConfig, group: usize, kernel: &K) {
    let mut scratch = vec![0u8; launch.scratch_bytes];
    for item in group_items(launch.block, group) {
        kernel.stage(&item, &mut scratch);
    }
    // group barrier
    for item in group_items(launch.block, group) {
        kernel.compute(&item, &scratch);
    }
}
