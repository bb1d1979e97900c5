/*
 * Run History
 *
 * Bounded chronological log of which PID ran on each tick, with
 * ProcessId::IDLE recorded for ticks where nothing ran. Feeds Gantt-style
 * views and CPU usage figures.
 *
 * Design:
 * - Fixed capacity (RUN_HISTORY_CAPACITY), no heap growth
 * - Overwrite on overflow: the oldest entry is evicted first
 * - Readers get copies, never a live view
 */

use heapless::Deque;

use crate::scheduler::ProcessId;

/// Maximum number of ticks remembered
pub const RUN_HISTORY_CAPACITY: usize = 500;

/// FIFO of the most recent tick outcomes
#[derive(Debug, Clone)]
pub struct RunHistory {
    entries: Deque<ProcessId, RUN_HISTORY_CAPACITY>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Append one tick outcome, evicting the oldest entry when full
    pub fn record(&mut self, pid: ProcessId) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        if self.entries.push_back(pid).is_err() {
            log::warn!("[History] Dropped entry for PID {}: buffer full", pid);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<ProcessId> {
        self.entries.back().copied()
    }

    /// Copy of the history, oldest first
    pub fn snapshot(&self) -> Vec<ProcessId> {
        self.entries.iter().copied().collect()
    }

    /// Copy of the last `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<ProcessId> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).copied().collect()
    }

    /// Percentage of busy (non-idle) ticks among the last `window` entries
    ///
    /// Returns 0.0 when the window or the history is empty.
    pub fn cpu_usage(&self, window: usize) -> f64 {
        let window = window.min(self.entries.len());
        if window == 0 {
            return 0.0;
        }
        let skip = self.entries.len() - window;
        let busy = self
            .entries
            .iter()
            .skip(skip)
            .filter(|pid| !pid.is_idle())
            .count();
        busy as f64 * 100.0 / window as f64
    }
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::new()
    }
}
