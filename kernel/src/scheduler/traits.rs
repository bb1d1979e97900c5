/*
 * Scheduler Trait Definitions
 *
 * This module defines the traits that separate scheduling policy from mechanism:
 *
 * - SchedulingPolicy: The policy interface that each dispatch algorithm implements
 * - SchedCtx: The read-only view of the process table that policies query
 *
 * Policies never touch Process structs directly. They see PIDs in the ready
 * queue and ask the context for the attributes they rank by.
 */

use std::collections::VecDeque;

use super::types::{Priority, ProcessId, SchedulingAlgorithm, TimeQuantum};

/// Ready queue shared by the scheduler and its policies, in insertion order
pub type ReadyQueue = VecDeque<ProcessId>;

/// Scheduling policy trait
///
/// FCFS, Round-Robin, Priority and SJF implement this trait.
/// The Scheduler (mechanism) holds a Box<dyn SchedulingPolicy> and asks it
/// for a decision once per tick.
///
/// Policies are responsible for:
/// - Deciding which process runs next (pick_next)
/// - Keeping their own bookkeeping (round-robin cursor, quantum)
///
/// A policy must not remove entries from the queue. Round-Robin may rotate
/// entries, which is the only mutation allowed.
pub trait SchedulingPolicy: Send {
    /// Choose the process that runs for the current tick
    ///
    /// # Arguments
    /// - `ctx`: Access to process attributes (priority, remaining burst)
    /// - `queue`: Ready queue in insertion order
    ///
    /// # Returns
    /// The selected PID, or None when the queue is empty
    fn pick_next(&mut self, ctx: &dyn SchedCtx, queue: &mut ReadyQueue) -> Option<ProcessId>;

    /// Notification that a process left the ready queue
    fn on_dequeued(&mut self, _pid: ProcessId) {}

    /// Notification that the configured quantum changed
    fn set_time_quantum(&mut self, _quantum: TimeQuantum) {}

    /// Which algorithm this policy implements
    fn algorithm(&self) -> SchedulingAlgorithm;

    /// Get the policy name for debugging
    fn name(&self) -> &'static str {
        self.algorithm().name()
    }
}

/// Kernel context interface for scheduling policies
///
/// The kernel's process table implements this. Lookups for PIDs the table
/// does not know return None; policies skip such entries.
pub trait SchedCtx {
    /// Get a process's priority
    fn priority(&self, pid: ProcessId) -> Option<Priority>;

    /// Estimated ticks left in a process's burst
    fn remaining_burst(&self, pid: ProcessId) -> Option<u64>;
}
