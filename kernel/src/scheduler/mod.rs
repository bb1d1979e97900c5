/*
 * Process Scheduling Subsystem
 *
 * This module holds everything that decides which simulated process gets
 * the CPU on a tick.
 *
 * POLICY / MECHANISM SPLIT:
 * ========================
 *
 * - Scheduler (mechanism): owns the ready queue, forwards each decision to
 *   the active policy, swaps policies on algorithm change
 * - SchedulingPolicy (policy): FCFS, Round-Robin, Priority, SJF; one file each
 *   under policies/
 * - SchedCtx: read-only view of the process table for policies that rank by
 *   priority or remaining burst
 *
 * The ready queue stores PIDs only. Processes themselves live in the
 * kernel's process table, so nothing here aliases a Process.
 *
 * PROCESS LIFECYCLE:
 * =================
 *
 *   New -> Ready -> Running -> Ready (loop)
 *    |                |
 *    v                v
 *   Terminated    Terminated
 *
 * - New: created, waiting for memory
 * - Ready: queued, eligible for selection
 * - Running: selected by the current tick (never survives the tick)
 * - Waiting: reserved, unused
 * - Terminated: memory denied or killed; absorbing
 */

pub mod events;
pub mod policies;
pub mod process;
#[allow(clippy::module_inception)]
pub mod scheduler;
pub mod traits;
pub mod types;

pub use events::{ProcessEvent, ProcessListener};
pub use policies::{FcfsPolicy, PriorityPolicy, RoundRobinPolicy, SjfPolicy, policy_for};
pub use process::{MemoryProfile, Process, ProcessInfo, ProcessSpec, ProcessState};
pub use scheduler::Scheduler;
pub use traits::{ReadyQueue, SchedCtx, SchedulingPolicy};
pub use types::{Priority, ProcessId, SchedulingAlgorithm, TimeQuantum, UnknownAlgorithm};
