/*
 * OS Kernel - Simulation Coordinator
 *
 * This module implements OsKernel, the object an external driver (GUI timer,
 * shell loop, test harness) talks to. It:
 * 1. Owns the process table (arena of Process keyed by PID)
 * 2. Gates admission on the memory manager: no pages, no process
 * 3. Advances simulated time one tick per `tick()` call
 * 4. Keeps the bounded run history for visualization
 * 5. Fans lifecycle events out to registered listeners
 *
 * LOCKING:
 * =======
 *
 * Every public operation runs inside one kernel-wide critical section, so
 * ticks, creations and kills never interleave partially.
 *
 * Creations and kills additionally take a dispatch turn for the whole call,
 * listener delivery included. Events are queued under the state lock and the
 * turn holder drains the queue in order once the state lock is released, so
 * listeners see events in the order the table changed. A listener may call
 * back into the kernel: the nested call sees that its thread already holds
 * the turn, skips the dispatch lock and leaves its events to the outer drain.
 *
 * Lock order is always dispatch -> state -> memory pool; the memory manager
 * never calls back into the kernel.
 *
 * TICK:
 * ====
 *
 *   scheduler.next() --None/Terminated--> history += IDLE
 *        |
 *        v
 *   Ready -> Running: cpu += 1, simulated access, memory fluctuation
 *        |
 *        v
 *   Running -> Ready, history += PID
 */

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use rand::SeedableRng;
use rand::rngs::StdRng;
use spin::{Mutex, MutexGuard};

use crate::config::KernelConfig;
use crate::error::KernelError;
use crate::history::RunHistory;
use crate::memory::{MemoryManager, MemoryStats};
use crate::scheduler::{
    Priority, Process, ProcessEvent, ProcessId, ProcessInfo, ProcessListener, ProcessSpec,
    ProcessState, SchedCtx, Scheduler, SchedulingAlgorithm, TimeQuantum,
};

/// Process table keyed by PID
///
/// PIDs only grow, so BTreeMap iteration order is creation order.
#[derive(Debug, Default)]
struct ProcessTable {
    processes: BTreeMap<ProcessId, Process>,
}

impl SchedCtx for ProcessTable {
    fn priority(&self, pid: ProcessId) -> Option<Priority> {
        self.processes.get(&pid).map(Process::priority)
    }

    fn remaining_burst(&self, pid: ProcessId) -> Option<u64> {
        self.processes.get(&pid).map(Process::remaining_burst)
    }
}

/// Everything guarded by the kernel lock
struct KernelState {
    table: ProcessTable,
    scheduler: Scheduler,
    history: RunHistory,
    /// None once the PID space above the base is used up
    next_pid: Option<u32>,
    tick_count: u64,
    rng: StdRng,
    /// Lifecycle events not yet delivered, oldest first
    pending: VecDeque<ProcessEvent>,
}

impl KernelState {
    fn allocate_pid(&mut self) -> Result<ProcessId, KernelError> {
        let pid = self.next_pid.ok_or(KernelError::PidsExhausted)?;
        self.next_pid = pid.checked_add(1);
        Ok(ProcessId(pid))
    }
}

/// The simulated operating system core
pub struct OsKernel {
    state: Mutex<KernelState>,
    memory: MemoryManager,
    listeners: Mutex<Vec<Arc<dyn ProcessListener>>>,
    /// Serializes creations and kills, listener delivery included
    dispatch: Mutex<()>,
    /// Thread currently holding the dispatch turn
    dispatch_owner: Mutex<Option<ThreadId>>,
}

/// A held dispatch turn; clears the owner before the lock is released
struct DispatchTurn<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
    _lock: MutexGuard<'a, ()>,
}

impl Drop for DispatchTurn<'_> {
    fn drop(&mut self) {
        *self.owner.lock() = None;
    }
}

impl OsKernel {
    /// Build a kernel from a validated configuration
    pub fn new(config: KernelConfig) -> Result<Self, KernelError> {
        config.validate()?;

        let (memory, rng) = match config.rng_seed {
            Some(seed) => (
                MemoryManager::with_seed(config.total_memory, config.page_size, seed)?,
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (
                MemoryManager::new(config.total_memory, config.page_size)?,
                StdRng::from_os_rng(),
            ),
        };

        let scheduler = Scheduler::new(config.algorithm, config.time_quantum);

        log::info!(
            "[Kernel] Initialized: {} memory in {} pages, policy {}, first PID {}",
            config.total_memory,
            memory.page_count(),
            config.algorithm,
            config.pid_base
        );

        Ok(Self {
            state: Mutex::new(KernelState {
                table: ProcessTable::default(),
                scheduler,
                history: RunHistory::new(),
                next_pid: Some(config.pid_base),
                tick_count: 0,
                rng,
                pending: VecDeque::new(),
            }),
            memory,
            listeners: Mutex::new(Vec::new()),
            dispatch: Mutex::new(()),
            dispatch_owner: Mutex::new(None),
        })
    }

    // ========================================================================
    // PROCESS LIFECYCLE
    // ========================================================================

    /// Create a process with default priority and burst estimate
    pub fn create_process(
        &self,
        name: impl Into<String>,
        required_memory: usize,
    ) -> Result<ProcessInfo, KernelError> {
        self.spawn(ProcessSpec::new(name, required_memory))
    }

    /// Create a process from a ProcessSpec
    ///
    /// The process gets the next PID and starts in New. If the memory
    /// manager cannot grant `required_memory` it becomes Terminated, is never
    /// placed in the table or ready queue, and the OutOfMemory error is
    /// returned. Otherwise it becomes Ready, joins the table and the tail of
    /// the ready queue, and listeners see a Created event.
    ///
    /// Fails with PidsExhausted once the PID space is used up.
    pub fn spawn(&self, spec: ProcessSpec) -> Result<ProcessInfo, KernelError> {
        let turn = self.enter_dispatch();
        let info = {
            let mut state = self.state.lock();
            let pid = state.allocate_pid()?;
            let required = spec.required_memory;
            let mut process = Process::new(pid, spec, state.tick_count);

            if let Err(err) = self.memory.allocate(&mut process, required) {
                process.set_state(ProcessState::Terminated);
                log::warn!(
                    "[Kernel] Rejected '{}' (PID {}): {}",
                    process.name(),
                    pid,
                    err
                );
                return Err(err.into());
            }

            process.set_state(ProcessState::Ready);
            let info = process.info();
            state.table.processes.insert(pid, process);
            state.scheduler.enqueue(pid);
            state.pending.push_back(ProcessEvent::Created(info.clone()));
            info
        };

        log::info!(
            "[Kernel] Created '{}' (PID {}, {} allocated)",
            info.name,
            info.pid,
            info.allocated_memory
        );
        self.drain_events(turn);
        Ok(info)
    }

    /// Terminate a process
    ///
    /// Frees its pages, removes it from the ready queue and the table, then
    /// notifies listeners. Unknown PIDs are a no-op, so killing twice is the
    /// same as killing once.
    ///
    /// # Returns
    /// true if a process was killed
    pub fn kill_process(&self, pid: ProcessId) -> bool {
        let turn = self.enter_dispatch();
        let info = {
            let mut state = self.state.lock();
            let Some(mut process) = state.table.processes.remove(&pid) else {
                log::debug!("[Kernel] Kill of unknown PID {} ignored", pid);
                return false;
            };
            process.set_state(ProcessState::Terminated);
            self.memory.free(&mut process);
            state.scheduler.dequeue(pid);
            let info = process.info();
            state.pending.push_back(ProcessEvent::Terminated(info.clone()));
            info
        };

        log::info!("[Kernel] Terminated '{}' (PID {})", info.name, info.pid);
        self.drain_events(turn);
        true
    }

    /// Kill every process in the table
    ///
    /// # Returns
    /// Number of processes killed
    pub fn shutdown(&self) -> usize {
        let pids: Vec<ProcessId> = self.state.lock().table.processes.keys().copied().collect();
        let killed = pids.into_iter().filter(|&pid| self.kill_process(pid)).count();
        log::info!("[Kernel] Shutdown killed {} processes", killed);
        killed
    }

    // ========================================================================
    // TIME
    // ========================================================================

    /// Advance the simulation by one tick
    ///
    /// # Returns
    /// The PID that ran, or None for an idle tick
    pub fn tick(&self) -> Option<ProcessId> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.tick_count += 1;

        let picked = state.scheduler.next(&state.table);
        let runnable = picked.and_then(|pid| {
            state
                .table
                .processes
                .get_mut(&pid)
                .filter(|process| !process.is_terminated())
        });

        let Some(process) = runnable else {
            state.history.record(ProcessId::IDLE);
            log::debug!("[Kernel] Tick {}: idle", state.tick_count);
            return None;
        };

        if process.state() == ProcessState::New {
            process.set_state(ProcessState::Ready);
        }

        process.set_state(ProcessState::Running);
        process.increment_cpu_time();
        self.memory.simulate_access(process);
        process.fluctuate_memory_usage(&mut state.rng);

        if process.state() == ProcessState::Running {
            process.set_state(ProcessState::Ready);
        }

        let pid = process.id();
        state.history.record(pid);
        log::debug!(
            "[Kernel] Tick {}: ran PID {} (cpu {})",
            state.tick_count,
            pid,
            process.cpu_time_used()
        );
        Some(pid)
    }

    /// Run `count` ticks, returning each outcome in order
    pub fn run(&self, count: usize) -> Vec<Option<ProcessId>> {
        (0..count).map(|_| self.tick()).collect()
    }

    /// Ticks elapsed since construction, idle ones included
    pub fn tick_count(&self) -> u64 {
        self.state.lock().tick_count
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn find_process(&self, pid: ProcessId) -> Option<ProcessInfo> {
        self.state.lock().table.processes.get(&pid).map(Process::info)
    }

    /// Snapshot of the process table in creation order
    pub fn processes(&self) -> Vec<ProcessInfo> {
        self.state
            .lock()
            .table
            .processes
            .values()
            .map(Process::info)
            .collect()
    }

    pub fn process_count(&self) -> usize {
        self.state.lock().table.processes.len()
    }

    /// Copy of the run history, oldest first; ProcessId::IDLE marks idle ticks
    pub fn run_history(&self) -> Vec<ProcessId> {
        self.state.lock().history.snapshot()
    }

    /// The last `count` history entries, oldest first
    pub fn recent_history(&self, count: usize) -> Vec<ProcessId> {
        self.state.lock().history.recent(count)
    }

    /// Busy percentage over the last `window` recorded ticks
    pub fn cpu_usage(&self, window: usize) -> f64 {
        self.state.lock().history.cpu_usage(window)
    }

    /// Ready queue snapshot, head first
    pub fn ready_queue(&self) -> Vec<ProcessId> {
        self.state.lock().scheduler.ready_queue()
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.memory.stats()
    }

    // ========================================================================
    // TUNING
    // ========================================================================

    pub fn algorithm(&self) -> SchedulingAlgorithm {
        self.state.lock().scheduler.algorithm()
    }

    pub fn set_algorithm(&self, algorithm: SchedulingAlgorithm) {
        self.state.lock().scheduler.set_algorithm(algorithm);
    }

    pub fn time_quantum(&self) -> TimeQuantum {
        self.state.lock().scheduler.time_quantum()
    }

    /// Set the Round-Robin quantum (clamped to at least one tick)
    pub fn set_time_quantum(&self, ticks: u32) {
        self.state.lock().scheduler.set_time_quantum(ticks);
    }

    /// Change a process's priority; false for unknown PIDs
    pub fn set_priority(&self, pid: ProcessId, priority: i32) -> bool {
        match self.state.lock().table.processes.get_mut(&pid) {
            Some(process) => {
                process.set_priority(Priority(priority));
                true
            }
            None => false,
        }
    }

    /// Change a process's burst estimate (clamped to at least one tick)
    pub fn set_estimated_burst(&self, pid: ProcessId, ticks: u32) -> bool {
        match self.state.lock().table.processes.get_mut(&pid) {
            Some(process) => {
                process.set_estimated_burst(ticks);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // LISTENERS
    // ========================================================================

    /// Register a lifecycle listener; registering the same Arc twice is a no-op
    pub fn add_listener(&self, listener: Arc<dyn ProcessListener>) {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|known| Arc::ptr_eq(known, &listener)) {
            return;
        }
        listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    // ========================================================================
    // EVENT DISPATCH
    // ========================================================================

    /// Take the dispatch turn, or None when this thread already holds it
    ///
    /// A nested call (a listener re-entering the kernel) must not wait on the
    /// turn its own outer call is holding.
    fn enter_dispatch(&self) -> Option<DispatchTurn<'_>> {
        let me = thread::current().id();
        if *self.dispatch_owner.lock() == Some(me) {
            return None;
        }
        let lock = self.dispatch.lock();
        *self.dispatch_owner.lock() = Some(me);
        Some(DispatchTurn {
            owner: &self.dispatch_owner,
            _lock: lock,
        })
    }

    /// Deliver queued events, oldest first, until the queue is empty, then
    /// give up the turn
    ///
    /// Nested calls carry no turn and only queue; the outermost caller
    /// delivers, so events raised by a listener reach every listener after
    /// the event being delivered.
    fn drain_events(&self, turn: Option<DispatchTurn<'_>>) {
        if turn.is_none() {
            return;
        }
        loop {
            let Some(event) = self.state.lock().pending.pop_front() else {
                break;
            };
            self.notify(&event);
        }
    }

    /// Deliver an event to every listener, in registration order
    ///
    /// The list is copied first so callbacks may register listeners or call
    /// back into the kernel.
    fn notify(&self, event: &ProcessEvent) {
        let listeners: Vec<Arc<dyn ProcessListener>> = self.listeners.lock().clone();
        for listener in &listeners {
            listener.notify(event);
        }
    }
}

impl core::fmt::Debug for OsKernel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("OsKernel")
            .field("scheduler", &state.scheduler)
            .field("processes", &state.table.processes.len())
            .field("tick_count", &state.tick_count)
            .field("memory", &self.memory)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Weak;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn kernel() -> OsKernel {
        OsKernel::new(KernelConfig::default().with_seed(11)).unwrap()
    }

    fn kernel_with(algorithm: SchedulingAlgorithm, quantum: u32) -> OsKernel {
        OsKernel::new(
            KernelConfig::default()
                .with_seed(11)
                .with_algorithm(algorithm)
                .with_time_quantum(quantum),
        )
        .unwrap()
    }

    fn assert_memory_consistent(kernel: &OsKernel) {
        let memory = kernel.memory();
        let mut owned = 0;
        for info in kernel.processes() {
            let pages = memory.pages_owned_by(info.pid);
            assert_eq!(info.allocated_memory, pages * memory.page_size());
            owned += pages;
        }
        assert_eq!(owned + memory.free_pages(), memory.page_count());
    }

    /// Records every event it sees
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ProcessEvent>>,
    }

    impl ProcessListener for Recorder {
        fn on_process_created(&self, process: &ProcessInfo) {
            self.events.lock().push(ProcessEvent::Created(process.clone()));
        }

        fn on_process_terminated(&self, process: &ProcessInfo) {
            self.events.lock().push(ProcessEvent::Terminated(process.clone()));
        }
    }

    #[test]
    fn end_to_end_admission_and_rejection() {
        let kernel = kernel_with(SchedulingAlgorithm::Fcfs, 3);
        assert_eq!(kernel.memory().page_count(), 16);

        let a = kernel.create_process("A", 100).unwrap();
        assert_eq!(a.state, ProcessState::Ready);
        assert_eq!(a.allocated_memory, 128);
        assert_eq!(kernel.memory().pages_owned_by(a.pid), 2);

        let err = kernel.create_process("B", 1000).unwrap_err();
        assert!(err.is_out_of_memory());
        assert_eq!(kernel.process_count(), 1);
        assert_eq!(kernel.ready_queue(), vec![a.pid]);
        assert_memory_consistent(&kernel);
    }

    #[test]
    fn pids_are_monotonic_and_not_reused() {
        let kernel = kernel();
        let a = kernel.create_process("a", 64).unwrap();
        assert!(kernel.create_process("huge", 4096).is_err());
        let b = kernel.create_process("b", 64).unwrap();
        kernel.kill_process(a.pid);
        let c = kernel.create_process("c", 64).unwrap();

        assert_eq!(a.pid, ProcessId(1));
        assert_eq!(b.pid, ProcessId(3));
        assert_eq!(c.pid, ProcessId(4));
    }

    #[test]
    fn pid_base_is_configurable() {
        let kernel = OsKernel::new(KernelConfig::default().with_seed(1).with_pid_base(100)).unwrap();
        assert_eq!(kernel.create_process("a", 1).unwrap().pid, ProcessId(100));
    }

    #[test]
    fn default_burst_is_derived_from_memory() {
        let kernel = kernel();
        assert_eq!(kernel.create_process("small", 32).unwrap().estimated_burst, 5);
        assert_eq!(kernel.create_process("big", 256).unwrap().estimated_burst, 16);
    }

    #[test]
    fn oversized_request_is_rejected_and_never_queued() {
        let kernel = kernel();
        let recorder = Arc::new(Recorder::default());
        kernel.add_listener(recorder.clone());

        assert!(kernel.create_process("too-big", 2048).is_err());
        assert!(kernel.processes().is_empty());
        assert!(kernel.ready_queue().is_empty());
        assert!(recorder.events.lock().is_empty());
        assert_eq!(kernel.tick(), None);
    }

    #[test]
    fn kill_frees_memory_and_is_idempotent() {
        let kernel = kernel();
        let a = kernel.create_process("a", 300).unwrap();
        let b = kernel.create_process("b", 64).unwrap();

        assert!(kernel.kill_process(a.pid));
        assert!(!kernel.kill_process(a.pid));
        assert!(!kernel.kill_process(ProcessId(999)));

        assert_eq!(kernel.find_process(a.pid), None);
        assert_eq!(kernel.ready_queue(), vec![b.pid]);
        assert_eq!(kernel.memory().used_memory(), 64);
        assert_memory_consistent(&kernel);
    }

    #[test]
    fn tick_accounts_cpu_and_leaves_process_ready() {
        let kernel = kernel_with(SchedulingAlgorithm::Fcfs, 3);
        let a = kernel.create_process("a", 64).unwrap();

        assert_eq!(kernel.tick(), Some(a.pid));
        assert_eq!(kernel.tick(), Some(a.pid));

        let info = kernel.find_process(a.pid).unwrap();
        assert_eq!(info.state, ProcessState::Ready);
        assert_eq!(info.cpu_time_used, 2);
        assert_eq!(kernel.memory().total_accesses(), 2);
        assert_eq!(kernel.tick_count(), 2);
    }

    #[test]
    fn idle_ticks_record_zero() {
        let kernel = kernel();
        assert_eq!(kernel.tick(), None);
        let a = kernel.create_process("a", 64).unwrap();
        kernel.tick();
        kernel.kill_process(a.pid);
        kernel.tick();
        assert_eq!(kernel.run_history(), vec![ProcessId::IDLE, a.pid, ProcessId::IDLE]);
        assert!((kernel.cpu_usage(3) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn round_robin_through_kernel() {
        let kernel = kernel_with(SchedulingAlgorithm::RoundRobin, 2);
        let a = kernel.create_process("a", 64).unwrap().pid;
        let b = kernel.create_process("b", 64).unwrap().pid;
        let ran: Vec<_> = kernel.run(8).into_iter().flatten().collect();
        assert_eq!(ran, vec![a, a, b, b, a, a, b, b]);
    }

    #[test]
    fn priority_changes_apply_next_tick() {
        let kernel = kernel_with(SchedulingAlgorithm::Priority, 3);
        kernel.spawn(ProcessSpec::new("a", 64).priority(1)).unwrap();
        let b = kernel.spawn(ProcessSpec::new("b", 64).priority(5)).unwrap().pid;
        let c = kernel.spawn(ProcessSpec::new("c", 64).priority(3)).unwrap().pid;

        assert_eq!(kernel.run(3), vec![Some(b); 3]);
        assert!(kernel.set_priority(c, 9));
        assert_eq!(kernel.tick(), Some(c));
        assert!(!kernel.set_priority(ProcessId(77), 1));
    }

    #[test]
    fn sjf_prefers_shortest_remaining_and_moves_on() {
        let kernel = kernel_with(SchedulingAlgorithm::Sjf, 3);
        let long = kernel.spawn(ProcessSpec::new("long", 64).estimated_burst(10)).unwrap().pid;
        let short = kernel.spawn(ProcessSpec::new("short", 64).estimated_burst(4)).unwrap().pid;

        assert_eq!(kernel.run(4), vec![Some(short); 4]);
        // short has 0 remaining now and keeps winning
        assert_eq!(kernel.tick(), Some(short));
        kernel.kill_process(short);
        assert_eq!(kernel.tick(), Some(long));
        assert!(kernel.set_estimated_burst(long, 0));
        assert_eq!(kernel.find_process(long).unwrap().estimated_burst, 1);
    }

    #[test]
    fn switching_algorithm_at_runtime() {
        let kernel = kernel_with(SchedulingAlgorithm::Fcfs, 1);
        let a = kernel.create_process("a", 64).unwrap().pid;
        let b = kernel.create_process("b", 64).unwrap().pid;
        assert_eq!(kernel.run(2), vec![Some(a), Some(a)]);

        kernel.set_algorithm(SchedulingAlgorithm::RoundRobin);
        assert_eq!(kernel.algorithm(), SchedulingAlgorithm::RoundRobin);
        assert_eq!(kernel.run(3), vec![Some(a), Some(b), Some(a)]);

        kernel.set_time_quantum(0);
        assert_eq!(kernel.time_quantum().get(), 1);
    }

    #[test]
    fn run_history_is_capped() {
        let kernel = kernel();
        let a = kernel.create_process("a", 64).unwrap().pid;
        kernel.run(crate::RUN_HISTORY_CAPACITY + 50);

        let history = kernel.run_history();
        assert_eq!(history.len(), crate::RUN_HISTORY_CAPACITY);
        assert!(history.iter().all(|&pid| pid == a));
        assert_eq!(kernel.tick_count(), crate::RUN_HISTORY_CAPACITY as u64 + 50);
        assert_eq!(kernel.recent_history(3), vec![a; 3]);
    }

    #[test]
    fn memory_profile_fluctuates_within_bounds() {
        let kernel = kernel_with(SchedulingAlgorithm::Fcfs, 1);
        let pid = kernel
            .spawn(ProcessSpec::new("editor", 128).memory_profile(20, 120))
            .unwrap()
            .pid;
        for _ in 0..200 {
            kernel.tick();
            let usage = kernel.find_process(pid).unwrap().simulated_memory_usage;
            assert!((20..=120).contains(&usage));
        }
    }

    #[test]
    fn listeners_see_events_in_order() {
        let kernel = kernel();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        kernel.add_listener(first.clone());
        kernel.add_listener(first.clone());
        kernel.add_listener(second.clone());
        assert_eq!(kernel.listener_count(), 2);

        let a = kernel.create_process("a", 64).unwrap();
        kernel.kill_process(a.pid);
        kernel.kill_process(a.pid);

        for recorder in [&first, &second] {
            let events = recorder.events.lock();
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].name(), "Created");
            assert_eq!(events[0].process().state, ProcessState::Ready);
            assert_eq!(events[1].name(), "Terminated");
            assert_eq!(events[1].process().state, ProcessState::Terminated);
            assert_eq!(events[1].process().allocated_memory, 0);
        }
    }

    /// Kills whatever gets created, through a weak handle to the kernel
    struct Reaper {
        kernel: Weak<OsKernel>,
    }

    impl ProcessListener for Reaper {
        fn on_process_created(&self, process: &ProcessInfo) {
            if let Some(kernel) = self.kernel.upgrade() {
                kernel.kill_process(process.pid);
            }
        }

        fn on_process_terminated(&self, process: &ProcessInfo) {
            if let Some(kernel) = self.kernel.upgrade() {
                assert!(!kernel.kill_process(process.pid));
            }
        }
    }

    #[test]
    fn listener_may_reenter_the_kernel() {
        let kernel = Arc::new(kernel());
        kernel.add_listener(Arc::new(Reaper {
            kernel: Arc::downgrade(&kernel),
        }));

        let info = kernel.create_process("short-lived", 64).unwrap();
        assert_eq!(info.state, ProcessState::Ready);
        assert_eq!(kernel.find_process(info.pid), None);
        assert_eq!(kernel.memory().used_memory(), 0);
        assert!(kernel.ready_queue().is_empty());
    }

    fn recorded(recorder: &Recorder) -> Vec<String> {
        recorder
            .events
            .lock()
            .iter()
            .map(|event| format!("{}({})", event.name(), event.process().pid))
            .collect()
    }

    #[test]
    fn events_raised_by_a_listener_follow_the_current_one() {
        let kernel = Arc::new(kernel());
        let recorder = Arc::new(Recorder::default());
        kernel.add_listener(Arc::new(Reaper {
            kernel: Arc::downgrade(&kernel),
        }));
        kernel.add_listener(recorder.clone());

        kernel.create_process("a", 64).unwrap();
        assert_eq!(recorded(&recorder), ["Created(1)", "Terminated(1)"]);
    }

    /// Holds the creating thread inside its Created callback until opened
    #[derive(Default)]
    struct Gate {
        entered: AtomicBool,
        open: AtomicBool,
    }

    impl ProcessListener for Gate {
        fn on_process_created(&self, _process: &ProcessInfo) {
            self.entered.store(true, Ordering::SeqCst);
            while !self.open.load(Ordering::SeqCst) {
                thread::yield_now();
            }
        }
    }

    #[test]
    fn racing_create_and_kill_are_delivered_in_table_order() {
        let kernel = Arc::new(kernel());
        let gate = Arc::new(Gate::default());
        let recorder = Arc::new(Recorder::default());
        kernel.add_listener(gate.clone());
        kernel.add_listener(recorder.clone());

        let creator = {
            let kernel = Arc::clone(&kernel);
            thread::spawn(move || kernel.create_process("a", 64).unwrap().pid)
        };
        while !gate.entered.load(Ordering::SeqCst) {
            thread::yield_now();
        }

        let killer = {
            let kernel = Arc::clone(&kernel);
            thread::spawn(move || kernel.kill_process(ProcessId(1)))
        };
        thread::sleep(Duration::from_millis(20));
        gate.open.store(true, Ordering::SeqCst);

        assert_eq!(creator.join().unwrap(), ProcessId(1));
        assert!(killer.join().unwrap());
        assert_eq!(recorded(&recorder), ["Created(1)", "Terminated(1)"]);
        assert_eq!(kernel.process_count(), 0);
    }

    #[test]
    fn running_out_of_pids_is_an_error() {
        let kernel =
            OsKernel::new(KernelConfig::default().with_seed(1).with_pid_base(u32::MAX)).unwrap();
        assert_eq!(
            kernel.create_process("last", 64).unwrap().pid,
            ProcessId(u32::MAX)
        );
        assert_eq!(
            kernel.create_process("one-more", 64).unwrap_err(),
            KernelError::PidsExhausted
        );
        assert_eq!(kernel.process_count(), 1);
        assert_eq!(kernel.memory().used_memory(), 64);
    }

    #[test]
    fn shutdown_kills_everything() {
        let kernel = kernel();
        let recorder = Arc::new(Recorder::default());
        kernel.add_listener(recorder.clone());
        for name in ["a", "b", "c"] {
            kernel.create_process(name, 100).unwrap();
        }
        assert_eq!(kernel.shutdown(), 3);
        assert_eq!(kernel.process_count(), 0);
        assert_eq!(kernel.memory().free_memory(), 1024);
        assert_eq!(recorder.events.lock().len(), 6);
    }

    #[test]
    fn concurrent_drivers_keep_invariants() {
        let kernel = Arc::new(kernel());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let kernel = Arc::clone(&kernel);
                std::thread::spawn(move || {
                    for round in 0..50 {
                        if let Ok(info) = kernel.create_process(format!("w{worker}-{round}"), 90) {
                            kernel.tick();
                            if round % 2 == 0 {
                                kernel.kill_process(info.pid);
                            }
                        }
                        kernel.tick();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_memory_consistent(&kernel);
        assert!(kernel.run_history().len() <= crate::RUN_HISTORY_CAPACITY);
        for info in kernel.processes() {
            assert_eq!(info.state, ProcessState::Ready);
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let err = OsKernel::new(KernelConfig::default().with_memory(100, 64)).unwrap_err();
        assert!(matches!(err, KernelError::Memory(_)));
    }
}
