/*
 * Process Abstraction
 *
 * This module implements the simulated process record. A Process is a
 * bookkeeping entry only; no real thread or OS process backs it.
 *
 * A process carries:
 * - Identity (PID, name)
 * - Lifecycle state
 * - Memory profile (required, granted, simulated usage)
 * - CPU accounting and scheduling hints (priority, estimated burst)
 *
 * Lifecycle:
 *
 *   New -> Ready (memory granted) -> Running -> Ready ...
 *    |                                 |
 *    +--> Terminated (memory denied)   +--> Terminated (killed)
 *
 * Running is transient: the kernel only holds a process in Running for the
 * duration of a single tick.
 */

use rand::Rng;

use super::types::{Priority, ProcessId};

/// Floor for the estimated burst the kernel derives at creation
pub const MIN_ESTIMATED_BURST: u32 = 5;

/// Required memory is divided by this to derive the default burst estimate
pub const BURST_MEMORY_DIVISOR: usize = 16;

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// Created, memory not yet granted
    New,
    /// Eligible for selection by the scheduler
    Ready,
    /// Being executed by the current tick
    Running,
    /// Reserved for I/O-wait modelling; nothing produces it yet
    Waiting,
    /// Absorbing state; the process is gone from every collection
    Terminated,
}

impl ProcessState {
    pub fn name(self) -> &'static str {
        match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::Waiting => "WAITING",
            ProcessState::Terminated => "TERMINATED",
        }
    }
}

impl core::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Simulated memory usage bounds for UI fluctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryProfile {
    pub min: usize,
    pub max: usize,
    pub current: usize,
}

impl MemoryProfile {
    /// Create a profile starting at its lower bound. Bounds given in the
    /// wrong order are swapped.
    pub fn new(min: usize, max: usize) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            current: min,
        }
    }

    /// Largest change a single fluctuation may apply
    pub fn step(&self) -> usize {
        ((self.max - self.min) / 10).max(1)
    }

    /// Move `current` by a random amount in `[-step, +step]`, staying in bounds
    pub fn fluctuate<R: Rng>(&mut self, rng: &mut R) {
        let step = self.step() as i64;
        let delta = rng.random_range(-step..=step);
        let next = (self.current as i64 + delta).clamp(self.min as i64, self.max as i64);
        self.current = next as usize;
    }
}

/// Creation parameters for a process
///
/// `OsKernel::spawn` consumes this; `OsKernel::create_process` is the
/// shorthand for a spec with only a name and a memory requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub name: String,
    pub required_memory: usize,
    pub priority: Priority,
    pub estimated_burst: Option<u32>,
    pub memory_profile: Option<MemoryProfile>,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, required_memory: usize) -> Self {
        Self {
            name: name.into(),
            required_memory,
            priority: Priority::DEFAULT,
            estimated_burst: None,
            memory_profile: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Priority(priority);
        self
    }

    /// Override the burst estimate the kernel would otherwise derive
    pub fn estimated_burst(mut self, ticks: u32) -> Self {
        self.estimated_burst = Some(ticks);
        self
    }

    pub fn memory_profile(mut self, min: usize, max: usize) -> Self {
        self.memory_profile = Some(MemoryProfile::new(min, max));
        self
    }

    /// Burst estimate used when the spec does not carry one
    pub fn default_burst(&self) -> u32 {
        let derived = self.required_memory / BURST_MEMORY_DIVISOR;
        u32::try_from(derived)
            .unwrap_or(u32::MAX)
            .max(MIN_ESTIMATED_BURST)
    }
}

/// A simulated process
///
/// Owned by the kernel's process table. The scheduler and memory manager
/// only ever refer to it by `ProcessId`.
#[derive(Debug, Clone)]
pub struct Process {
    id: ProcessId,
    name: String,
    state: ProcessState,
    priority: Priority,
    required_memory: usize,
    allocated_memory: usize,
    cpu_time_used: u64,
    estimated_burst: u32,
    memory_profile: Option<MemoryProfile>,
    created_at_tick: u64,
}

impl Process {
    /// Create a process in the `New` state from a spec
    pub fn new(id: ProcessId, spec: ProcessSpec, created_at_tick: u64) -> Self {
        let estimated_burst = spec
            .estimated_burst
            .unwrap_or_else(|| spec.default_burst())
            .max(1);
        Process {
            id,
            name: spec.name,
            state: ProcessState::New,
            priority: spec.priority,
            required_memory: spec.required_memory,
            allocated_memory: 0,
            cpu_time_used: 0,
            estimated_burst,
            memory_profile: spec.memory_profile,
            created_at_tick,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn required_memory(&self) -> usize {
        self.required_memory
    }

    pub fn allocated_memory(&self) -> usize {
        self.allocated_memory
    }

    /// Set by the memory manager only
    pub(crate) fn set_allocated_memory(&mut self, amount: usize) {
        self.allocated_memory = amount;
    }

    pub fn cpu_time_used(&self) -> u64 {
        self.cpu_time_used
    }

    /// Account one tick of CPU time
    pub fn increment_cpu_time(&mut self) {
        self.cpu_time_used += 1;
    }

    pub fn estimated_burst(&self) -> u32 {
        self.estimated_burst
    }

    /// Update the burst estimate (clamped to at least one tick)
    pub fn set_estimated_burst(&mut self, ticks: u32) {
        self.estimated_burst = ticks.max(1);
    }

    /// Estimated ticks left before the burst completes, never negative
    pub fn remaining_burst(&self) -> u64 {
        u64::from(self.estimated_burst).saturating_sub(self.cpu_time_used)
    }

    pub fn memory_profile(&self) -> Option<&MemoryProfile> {
        self.memory_profile.as_ref()
    }

    /// Simulated memory the process is "using" right now
    pub fn simulated_memory_usage(&self) -> usize {
        self.memory_profile
            .map(|profile| profile.current)
            .unwrap_or(self.allocated_memory)
    }

    /// Apply one random step to the simulated usage, if a profile exists
    pub fn fluctuate_memory_usage<R: Rng>(&mut self, rng: &mut R) {
        if let Some(profile) = self.memory_profile.as_mut() {
            profile.fluctuate(rng);
        }
    }

    pub fn created_at_tick(&self) -> u64 {
        self.created_at_tick
    }

    /// Read-only snapshot handed to observers
    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.id,
            name: self.name.clone(),
            state: self.state,
            priority: self.priority,
            required_memory: self.required_memory,
            allocated_memory: self.allocated_memory,
            simulated_memory_usage: self.simulated_memory_usage(),
            cpu_time_used: self.cpu_time_used,
            estimated_burst: self.estimated_burst,
            created_at_tick: self.created_at_tick,
        }
    }
}

/// Snapshot of a process, detached from the kernel's table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: ProcessId,
    pub name: String,
    pub state: ProcessState,
    pub priority: Priority,
    pub required_memory: usize,
    pub allocated_memory: usize,
    pub simulated_memory_usage: usize,
    pub cpu_time_used: u64,
    pub estimated_burst: u32,
    pub created_at_tick: u64,
}
