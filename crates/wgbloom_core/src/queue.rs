//! In-order submission queue.
//!
//! Every submission runs to completion before the next one starts and leaves
//! an [`Event`]. A submission whose preconditions fail is logged and recorded
//! as skipped; later submissions still run.
use crate::device::{Device, DeviceLimits, DispatchStats, WorkGroupKernel};
use crate::errors::Result;
use crate::grid::LaunchConfig;
use serde::Serialize;
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum EventStatus {
    Complete { stats: DispatchStats, launch: LaunchConfig },
    Skipped { reason: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct Event {
    pub name: String,
    #[serde(flatten)]
    pub status: EventStatus,
    pub elapsed_ms: f64,
}

impl Event {
    pub fn is_complete(&self) -> bool {
        matches!(self.status, EventStatus::Complete { .. })
    }
}

pub struct Queue<'d, D: Device> {
    device: &'d D,
    events: Vec<Event>,
}

impl<'d, D: Device> Queue<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self { device, events: Vec::new() }
    }

    pub fn device(&self) -> &D { self.device }

    /// `prepare` checks preconditions against the device limits and builds
    /// the launch and kernel; the dispatch only happens if it succeeds.
    pub fn submit<K, F>(&mut self, name: &str, prepare: F) -> &Event
    where
        K: WorkGroupKernel,
        F: FnOnce(&DeviceLimits) -> Result<(LaunchConfig, K)>,
    {
        let start = Instant::now();
        let outcome = prepare(self.device.limits()).and_then(|(launch, kernel)| {
            self.device.dispatch(&launch, &kernel).map(|stats| (launch, stats))
        });
        let status = match outcome {
            Ok((launch, stats)) => EventStatus::Complete { stats, launch },
            Err(e) => {
                tracing::error!(kernel = name, "dispatch skipped: {e}");
                EventStatus::Skipped { reason: e.to_string() }
            }
        };
        let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;
        self.events.push(Event { name: name.to_string(), status, elapsed_ms });
        &self.events[self.events.len() - 1]
    }

    pub fn events(&self) -> &[Event] { &self.events }

    pub fn into_events(self) -> Vec<Event> { self.events }
}
