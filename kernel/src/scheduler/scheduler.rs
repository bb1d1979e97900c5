/*
 * Scheduler - Mechanism Layer
 *
 * This module implements the Scheduler, the stable mechanism layer that:
 * 1. Owns the ready queue (FIFO insertion, PIDs only)
 * 2. Holds the active scheduling policy (Box<dyn SchedulingPolicy>)
 * 3. Rebuilds the policy when the algorithm is switched
 * 4. Provides the one-step decision `next()` that the kernel calls per tick
 *
 * The Scheduler decides WHO runs. How much work happens per decision is the
 * kernel's business, so every policy is non-preemptive from here.
 */

use super::{
    ProcessId,
    policies::policy_for,
    traits::{ReadyQueue, SchedCtx, SchedulingPolicy},
    types::{SchedulingAlgorithm, TimeQuantum},
};

/// Ready queue plus the active dispatch policy
pub struct Scheduler {
    /// READY processes in insertion order
    ready_queue: ReadyQueue,

    /// The active scheduling policy
    policy: Box<dyn SchedulingPolicy>,

    /// Quantum handed to Round-Robin, kept across algorithm switches
    time_quantum: TimeQuantum,
}

impl Scheduler {
    /// Create a scheduler running `algorithm` with the given quantum
    pub fn new(algorithm: SchedulingAlgorithm, time_quantum: TimeQuantum) -> Self {
        let policy = policy_for(algorithm, time_quantum);
        log::info!(
            "[Scheduler] Initialized with policy: {} (quantum {})",
            policy.name(),
            time_quantum.get()
        );
        Self {
            ready_queue: ReadyQueue::new(),
            policy,
            time_quantum,
        }
    }

    /// Active algorithm
    pub fn algorithm(&self) -> SchedulingAlgorithm {
        self.policy.algorithm()
    }

    /// Get the name of the active policy
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Switch algorithm
    ///
    /// Always installs a fresh policy, so Round-Robin cursor and quantum
    /// accounting restart even when switching RR -> RR.
    pub fn set_algorithm(&mut self, algorithm: SchedulingAlgorithm) {
        log::info!(
            "[Scheduler] Switching policy {} -> {}",
            self.policy.name(),
            algorithm.name()
        );
        self.policy = policy_for(algorithm, self.time_quantum);
    }

    pub fn time_quantum(&self) -> TimeQuantum {
        self.time_quantum
    }

    /// Set the Round-Robin quantum (clamped to at least one tick)
    pub fn set_time_quantum(&mut self, ticks: u32) {
        self.time_quantum = TimeQuantum::new(ticks);
        self.policy.set_time_quantum(self.time_quantum);
    }

    /// Add a process to the tail of the ready queue
    ///
    /// Enqueueing a PID that is already queued is a no-op.
    pub fn enqueue(&mut self, pid: ProcessId) {
        if self.ready_queue.contains(&pid) {
            log::debug!("[Scheduler] PID {} already in ready queue", pid);
            return;
        }
        self.ready_queue.push_back(pid);
    }

    /// Remove a process from anywhere in the ready queue
    ///
    /// Returns whether the PID was queued.
    pub fn dequeue(&mut self, pid: ProcessId) -> bool {
        let before = self.ready_queue.len();
        self.ready_queue.retain(|&id| id != pid);
        self.policy.on_dequeued(pid);
        self.ready_queue.len() != before
    }

    /// Pick the process for this tick
    ///
    /// Does not remove the selection from the queue; only Round-Robin
    /// reorders it, by rotating an expired process to the tail.
    pub fn next(&mut self, ctx: &dyn SchedCtx) -> Option<ProcessId> {
        if self.ready_queue.is_empty() {
            return None;
        }
        let picked = self.policy.pick_next(ctx, &mut self.ready_queue);
        log::debug!("[Scheduler] {} picked {:?}", self.policy.name(), picked);
        picked
    }

    pub fn contains(&self, pid: ProcessId) -> bool {
        self.ready_queue.contains(&pid)
    }

    pub fn len(&self) -> usize {
        self.ready_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready_queue.is_empty()
    }

    /// Snapshot of the ready queue, head first
    pub fn ready_queue(&self) -> Vec<ProcessId> {
        self.ready_queue.iter().copied().collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulingAlgorithm::default(), TimeQuantum::default())
    }
}

impl core::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("policy", &self.policy.name())
            .field("time_quantum", &self.time_quantum.get())
            .field("ready_queue", &self.ready_queue)
            .finish()
    }
}
