/*
 * Process Lifecycle Events
 *
 * This module defines the events the kernel reports to outside observers
 * (task manager views, loggers, test probes) when processes enter or leave
 * the system.
 *
 * Events are collected while the kernel holds its lock and delivered after
 * it is released, in listener registration order. A listener may therefore
 * call back into the kernel, including kill_process on the same PID.
 */

use super::process::ProcessInfo;

/// Events the kernel reports to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A process was admitted: memory granted, entered the table and ready queue
    Created(ProcessInfo),

    /// A process was killed and removed from every collection
    ///
    /// The snapshot is taken after removal; the PID is no longer in the table.
    Terminated(ProcessInfo),
}

impl ProcessEvent {
    /// Get a short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ProcessEvent::Created(_) => "Created",
            ProcessEvent::Terminated(_) => "Terminated",
        }
    }

    /// The process the event is about
    pub fn process(&self) -> &ProcessInfo {
        match self {
            ProcessEvent::Created(info) | ProcessEvent::Terminated(info) => info,
        }
    }
}

/// Observer of process lifecycle changes
///
/// Both hooks default to no-ops so listeners only implement what they need.
/// Callbacks run synchronously on the thread that triggered the change and
/// should return quickly.
pub trait ProcessListener: Send + Sync {
    fn on_process_created(&self, _process: &ProcessInfo) {}

    fn on_process_terminated(&self, _process: &ProcessInfo) {}

    /// Route an event to the matching hook
    fn notify(&self, event: &ProcessEvent) {
        match event {
            ProcessEvent::Created(info) => self.on_process_created(info),
            ProcessEvent::Terminated(info) => self.on_process_terminated(info),
        }
    }
}
