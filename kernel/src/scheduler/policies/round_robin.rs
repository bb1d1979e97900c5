/*
 * Round-Robin Scheduling Policy
 *
 * This module implements the round-robin scheduling policy.
 * It keeps a cursor on the active process and a count of ticks left in its
 * quantum. When the quantum runs out, the active process is rotated to the
 * tail of the ready queue and the new head becomes active.
 *
 * Features:
 * - Equal quantum for every process
 * - Quantum changes take effect at the next selection
 * - Cursor cleared when the active process leaves the queue
 */

use super::super::{
    ProcessId,
    traits::{ReadyQueue, SchedCtx, SchedulingPolicy},
    types::{SchedulingAlgorithm, TimeQuantum},
};

/// Round-Robin scheduling policy
#[derive(Debug, Clone)]
pub struct RoundRobinPolicy {
    /// Ticks granted per turn
    quantum: TimeQuantum,

    /// Process holding the current turn
    current: Option<ProcessId>,

    /// Ticks left in the current turn
    remaining: u32,
}

impl RoundRobinPolicy {
    /// Create a new Round-Robin policy
    pub fn new(quantum: TimeQuantum) -> Self {
        Self {
            quantum,
            current: None,
            remaining: 0,
        }
    }

    /// Process holding the current turn, if any
    pub fn current(&self) -> Option<ProcessId> {
        self.current
    }

    /// Ticks left in the current turn
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Move `pid` from wherever it sits in the queue to the tail
    fn rotate_to_tail(queue: &mut ReadyQueue, pid: ProcessId) {
        if let Some(pos) = queue.iter().position(|&id| id == pid) {
            queue.remove(pos);
            queue.push_back(pid);
        }
    }
}

impl SchedulingPolicy for RoundRobinPolicy {
    fn pick_next(&mut self, _ctx: &dyn SchedCtx, queue: &mut ReadyQueue) -> Option<ProcessId> {
        let still_queued = self.current.is_some_and(|pid| queue.contains(&pid));

        if !still_queued || self.remaining == 0 {
            if let (Some(prev), true) = (self.current, still_queued) {
                log::debug!("[RR Policy] Quantum expired for PID {}, rotating to tail", prev);
                Self::rotate_to_tail(queue, prev);
            }
            self.current = queue.front().copied();
            self.remaining = self.quantum.get();
        }

        let current = self.current?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(current)
    }

    fn on_dequeued(&mut self, pid: ProcessId) {
        if self.current == Some(pid) {
            self.current = None;
            self.remaining = 0;
        }
    }

    fn set_time_quantum(&mut self, quantum: TimeQuantum) {
        self.quantum = quantum;
    }

    fn algorithm(&self) -> SchedulingAlgorithm {
        SchedulingAlgorithm::RoundRobin
    }
}

impl Default for RoundRobinPolicy {
    fn default() -> Self {
        Self::new(TimeQuantum::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::policies::test_ctx::{TestCtx, queue};

    fn run(policy: &mut RoundRobinPolicy, q: &mut ReadyQueue, calls: usize) -> Vec<u32> {
        let ctx = TestCtx::default();
        (0..calls)
            .filter_map(|_| policy.pick_next(&ctx, q))
            .map(ProcessId::as_u32)
            .collect()
    }

    #[test]
    fn two_processes_alternate_per_quantum() {
        let mut policy = RoundRobinPolicy::new(TimeQuantum::new(2));
        let mut q = queue(&[1, 2]);
        assert_eq!(run(&mut policy, &mut q, 8), vec![1, 1, 2, 2, 1, 1, 2, 2]);
    }

    #[test]
    fn quantum_of_one_rotates_every_call() {
        let mut policy = RoundRobinPolicy::new(TimeQuantum::new(1));
        let mut q = queue(&[1, 2, 3]);
        assert_eq!(run(&mut policy, &mut q, 6), vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn removed_active_process_hands_over_immediately() {
        let mut policy = RoundRobinPolicy::new(TimeQuantum::new(3));
        let mut q = queue(&[1, 2]);
        assert_eq!(run(&mut policy, &mut q, 1), vec![1]);

        q.retain(|&pid| pid != ProcessId(1));
        policy.on_dequeued(ProcessId(1));
        assert_eq!(policy.current(), None);

        assert_eq!(run(&mut policy, &mut q, 3), vec![2, 2, 2]);
    }

    #[test]
    fn vanished_cursor_without_notification_is_not_requeued() {
        let mut policy = RoundRobinPolicy::new(TimeQuantum::new(3));
        let mut q = queue(&[1, 2]);
        run(&mut policy, &mut q, 1);

        q.retain(|&pid| pid != ProcessId(1));
        assert_eq!(run(&mut policy, &mut q, 1), vec![2]);
        assert_eq!(q, queue(&[2]));
    }

    #[test]
    fn new_quantum_applies_at_next_turn() {
        let mut policy = RoundRobinPolicy::new(TimeQuantum::new(2));
        let mut q = queue(&[1, 2]);
        assert_eq!(run(&mut policy, &mut q, 1), vec![1]);
        policy.set_time_quantum(TimeQuantum::new(3));
        assert_eq!(run(&mut policy, &mut q, 4), vec![1, 2, 2, 2]);
    }

    #[test]
    fn empty_queue_is_idle() {
        let mut policy = RoundRobinPolicy::default();
        let mut q = queue(&[]);
        assert!(run(&mut policy, &mut q, 3).is_empty());
        assert_eq!(policy.current(), None);
    }
}
