/*
 * Scheduler Type Definitions
 *
 * This module defines the core types used throughout the scheduler subsystem.
 * These types are designed to be lightweight, Copy-able, and suitable for
 * use in both policy and mechanism layers.
 */

use core::fmt;
use core::str::FromStr;

/// Unique identifier for a simulated process
///
/// PIDs are handed out by the kernel in strictly increasing order and are
/// never reused within one kernel instance. `ProcessId(0)` is reserved for
/// the idle marker in the run history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// Idle marker recorded when a tick finds nothing to run
    pub const IDLE: ProcessId = ProcessId(0);

    /// Get the raw ID value
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Check whether this is the idle marker
    pub fn is_idle(self) -> bool {
        self == Self::IDLE
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process priority
///
/// Higher values indicate higher priority. Only the Priority policy reads it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Priority given to every process unless the creator overrides it
    pub const DEFAULT: Priority = Priority(1);
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

/// Round-Robin time quantum in ticks
///
/// Always at least one tick; `new` clamps smaller values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimeQuantum(u32);

impl TimeQuantum {
    /// Default quantum (3 ticks)
    pub const DEFAULT: TimeQuantum = TimeQuantum(3);

    pub fn new(ticks: u32) -> Self {
        TimeQuantum(ticks.max(1))
    }

    /// Get the value as u32
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for TimeQuantum {
    fn default() -> Self {
        TimeQuantum::DEFAULT
    }
}

/// The dispatch policies the scheduler can switch between at runtime
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SchedulingAlgorithm {
    /// First-come-first-served, never rotates the queue head
    Fcfs,
    /// Rotating queue with a fixed quantum per turn
    RoundRobin,
    /// Highest priority value first
    Priority,
    /// Shortest remaining estimated burst first
    Sjf,
}

impl SchedulingAlgorithm {
    pub const ALL: [SchedulingAlgorithm; 4] = [
        SchedulingAlgorithm::Fcfs,
        SchedulingAlgorithm::RoundRobin,
        SchedulingAlgorithm::Priority,
        SchedulingAlgorithm::Sjf,
    ];

    /// Short name used by drivers and logs
    pub fn name(self) -> &'static str {
        match self {
            SchedulingAlgorithm::Fcfs => "FCFS",
            SchedulingAlgorithm::RoundRobin => "Round-Robin",
            SchedulingAlgorithm::Priority => "Priority",
            SchedulingAlgorithm::Sjf => "SJF",
        }
    }
}

impl Default for SchedulingAlgorithm {
    fn default() -> Self {
        SchedulingAlgorithm::RoundRobin
    }
}

impl fmt::Display for SchedulingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an algorithm name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown scheduling algorithm: {}", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for SchedulingAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fcfs" | "fifo" => Ok(SchedulingAlgorithm::Fcfs),
            "rr" | "round-robin" | "round_robin" | "roundrobin" => {
                Ok(SchedulingAlgorithm::RoundRobin)
            }
            "priority" | "prio" => Ok(SchedulingAlgorithm::Priority),
            "sjf" => Ok(SchedulingAlgorithm::Sjf),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}
