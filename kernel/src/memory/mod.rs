/*
 * Memory Management
 *
 * High-level module that ties together:
 *  - Simulated pages (page)
 *  - The paged allocator processes compete for (manager)
 *
 * All sizes are logical units ("MB" in the task manager); nothing here
 * touches real memory.
 */

pub mod manager;
pub mod page;

pub use manager::MemoryManager;
pub use page::{MemoryPage, PageFlags};

use crate::scheduler::ProcessId;

/// Memory subsystem errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// Page size of zero
    ZeroPageSize,
    /// Pool of zero total memory
    ZeroTotalMemory,
    /// Total memory is not a whole number of pages
    Misaligned { total: usize, page_size: usize },
    /// Not enough free pages to satisfy a request
    OutOfMemory {
        requested_pages: usize,
        free_pages: usize,
    },
}

impl core::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MemoryError::ZeroPageSize => write!(f, "Page size must be positive"),
            MemoryError::ZeroTotalMemory => write!(f, "Total memory must be positive"),
            MemoryError::Misaligned { total, page_size } => write!(
                f,
                "Total memory {} is not a multiple of page size {}",
                total, page_size
            ),
            MemoryError::OutOfMemory {
                requested_pages,
                free_pages,
            } => write!(
                f,
                "Not enough memory: {} pages requested, {} free",
                requested_pages, free_pages
            ),
        }
    }
}

impl std::error::Error for MemoryError {}

/// One page as seen by a memory monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub index: usize,
    pub owner: Option<ProcessId>,
    pub accessed: bool,
}

/// Point-in-time view of the page pool and access counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    pub total: usize,
    pub used: usize,
    pub free: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub pages: Vec<PageInfo>,
    pub total_accesses: u64,
    pub page_faults: u64,
    pub tlb_hits: u64,
    pub tlb_misses: u64,
}

impl MemoryStats {
    /// Fraction of simulated accesses that hit the TLB, 0.0 with no accesses
    pub fn tlb_hit_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            0.0
        } else {
            self.tlb_hits as f64 / self.total_accesses as f64
        }
    }

    pub fn free_pages(&self) -> usize {
        self.pages.iter().filter(|page| page.owner.is_none()).count()
    }
}
