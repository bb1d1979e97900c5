/*
 * Scheduling Policies Module
 *
 * This module contains the scheduling policy implementations.
 * Each policy implements the SchedulingPolicy trait and can be swapped into
 * the Scheduler at runtime.
 *
 * Available policies:
 * - FcfsPolicy: First-come-first-served, non-rotating
 * - RoundRobinPolicy: Rotating queue with a fixed quantum
 * - PriorityPolicy: Highest priority value wins
 * - SjfPolicy: Shortest remaining estimated burst wins
 */

pub mod fcfs;
pub mod priority;
pub mod round_robin;
pub mod sjf;

pub use fcfs::FcfsPolicy;
pub use priority::PriorityPolicy;
pub use round_robin::RoundRobinPolicy;
pub use sjf::SjfPolicy;

use super::traits::SchedulingPolicy;
use super::types::{SchedulingAlgorithm, TimeQuantum};

/// Build a fresh policy for an algorithm
///
/// Fresh means no carried-over bookkeeping: switching algorithms always
/// starts Round-Robin accounting from scratch.
pub fn policy_for(algorithm: SchedulingAlgorithm, quantum: TimeQuantum) -> Box<dyn SchedulingPolicy> {
    match algorithm {
        SchedulingAlgorithm::Fcfs => Box::new(FcfsPolicy),
        SchedulingAlgorithm::RoundRobin => Box::new(RoundRobinPolicy::new(quantum)),
        SchedulingAlgorithm::Priority => Box::new(PriorityPolicy),
        SchedulingAlgorithm::Sjf => Box::new(SjfPolicy),
    }
}
