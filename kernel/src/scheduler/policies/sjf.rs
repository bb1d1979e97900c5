/*
 * Shortest-Job-First Scheduling Policy
 *
 * Picks the ready process with the smallest remaining estimated burst,
 * `max(estimated_burst - cpu_time_used, 0)`. Ties go to the earliest
 * process in the queue.
 */

use super::super::{
    ProcessId,
    traits::{ReadyQueue, SchedCtx, SchedulingPolicy},
    types::SchedulingAlgorithm,
};

/// SJF policy, stateless
#[derive(Debug, Default, Clone, Copy)]
pub struct SjfPolicy;

impl SchedulingPolicy for SjfPolicy {
    fn pick_next(&mut self, ctx: &dyn SchedCtx, queue: &mut ReadyQueue) -> Option<ProcessId> {
        // min_by_key keeps the first of several equal minima
        queue
            .iter()
            .filter_map(|&pid| ctx.remaining_burst(pid).map(|remaining| (pid, remaining)))
            .min_by_key(|&(_, remaining)| remaining)
            .map(|(pid, _)| pid)
    }

    fn algorithm(&self) -> SchedulingAlgorithm {
        SchedulingAlgorithm::Sjf
    }
}
