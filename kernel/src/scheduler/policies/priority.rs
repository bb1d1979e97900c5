/*
 * Priority Scheduling Policy
 *
 * Picks the ready process with the highest priority value. Equal priorities
 * fall back to queue (insertion) order: the first one seen wins.
 */

use super::super::{
    ProcessId,
    traits::{ReadyQueue, SchedCtx, SchedulingPolicy},
    types::{Priority, SchedulingAlgorithm},
};

/// Priority policy, stateless
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityPolicy;

impl SchedulingPolicy for PriorityPolicy {
    fn pick_next(&mut self, ctx: &dyn SchedCtx, queue: &mut ReadyQueue) -> Option<ProcessId> {
        let mut best: Option<(ProcessId, Priority)> = None;
        for &pid in queue.iter() {
            let Some(priority) = ctx.priority(pid) else {
                continue;
            };
            // strict comparison keeps the earliest entry on ties
            if best.is_none_or(|(_, top)| priority > top) {
                best = Some((pid, priority));
            }
        }
        best.map(|(pid, _)| pid)
    }

    fn algorithm(&self) -> SchedulingAlgorithm {
        SchedulingAlgorithm::Priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::policies::test_ctx::{TestCtx, queue};

    #[test]
    fn highest_priority_wins_every_call() {
        let ctx = TestCtx::default().with(1, 1, 10).with(2, 5, 10).with(3, 3, 10);
        let mut q = queue(&[1, 2, 3]);
        let mut policy = PriorityPolicy;
        for _ in 0..4 {
            assert_eq!(policy.pick_next(&ctx, &mut q), Some(ProcessId(2)));
        }
        assert_eq!(q, queue(&[1, 2, 3]));
    }

    #[test]
    fn ties_go_to_earliest_in_queue() {
        let ctx = TestCtx::default().with(4, 2, 0).with(5, 7, 0).with(6, 7, 0);
        let mut q = queue(&[4, 5, 6]);
        assert_eq!(PriorityPolicy.pick_next(&ctx, &mut q), Some(ProcessId(5)));

        let mut q = queue(&[6, 4, 5]);
        assert_eq!(PriorityPolicy.pick_next(&ctx, &mut q), Some(ProcessId(6)));
    }

    #[test]
    fn negative_priorities_compare_normally() {
        let ctx = TestCtx::default().with(1, -3, 0).with(2, -1, 0);
        let mut q = queue(&[1, 2]);
        assert_eq!(PriorityPolicy.pick_next(&ctx, &mut q), Some(ProcessId(2)));
    }
}
