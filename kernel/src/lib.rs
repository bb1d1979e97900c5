/*
 * SimOS Kernel
 *
 * Process scheduling core of the SimOS teaching simulator. The desktop,
 * windows and applications of the simulator sit on top of this crate and
 * drive it through a handful of calls:
 *
 * - create_process / spawn / kill_process
 * - tick (one unit of simulated CPU time)
 * - set_algorithm / set_time_quantum
 * - processes / run_history / memory_stats snapshots
 * - ProcessListener callbacks for created / terminated events
 *
 * There are no threads inside the core. An external driver calls `tick()`
 * on whatever cadence it likes; every call is synchronous.
 *
 * Layout:
 * - memory:    fixed page pool and its all-or-nothing allocator
 * - scheduler: process records, ready queue, FCFS / RR / Priority / SJF
 * - kernel:    OsKernel, which ties the two together
 * - history:   bounded run history
 * - config / error / utils: construction parameters, errors, logging
 */

pub mod config;
pub mod error;
pub mod history;
pub mod kernel;
pub mod memory;
pub mod scheduler;
pub mod utils;

pub use config::KernelConfig;
pub use error::KernelError;
pub use history::{RUN_HISTORY_CAPACITY, RunHistory};
pub use kernel::OsKernel;
pub use memory::{MemoryError, MemoryManager, MemoryStats, PageInfo};
pub use scheduler::{
    Priority, ProcessEvent, ProcessId, ProcessInfo, ProcessListener, ProcessSpec, ProcessState,
    Scheduler, SchedulingAlgorithm, TimeQuantum,
};
