/*
 * First-Come-First-Served Scheduling Policy
 *
 * Always runs the head of the ready queue and never rotates it. The head
 * keeps the CPU on every tick until it leaves the queue (killed).
 */

use super::super::{
    ProcessId,
    traits::{ReadyQueue, SchedCtx, SchedulingPolicy},
    types::SchedulingAlgorithm,
};

/// FCFS policy, stateless
#[derive(Debug, Default, Clone, Copy)]
pub struct FcfsPolicy;

impl SchedulingPolicy for FcfsPolicy {
    fn pick_next(&mut self, _ctx: &dyn SchedCtx, queue: &mut ReadyQueue) -> Option<ProcessId> {
        queue.front().copied()
    }

    fn algorithm(&self) -> SchedulingAlgorithm {
        SchedulingAlgorithm::Fcfs
    }
}
