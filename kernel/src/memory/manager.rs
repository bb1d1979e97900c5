/*
 * Paged Memory Manager
 *
 * Fixed pool of fixed-size pages handed out to simulated processes.
 * Allocation counts pages, not addresses: a process gets whichever free
 * pages come first in index order.
 *
 * Guarantees:
 * - Allocation is all-or-nothing; a failed request changes no page
 * - A process's allocated memory always equals pages owned * page size
 * - Access counters only ever grow
 *
 * All state sits behind one spin lock, so every mutation is serialized.
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spin::Mutex;

use super::{MemoryError, MemoryPage, MemoryStats, PageInfo};
use crate::scheduler::{Process, ProcessId};

/// Base TLB hit probability before the allocation share is added
const BASE_HIT_PROBABILITY: f64 = 0.4;

/// Cap on the allocation-share bonus (hit probability tops out at 0.9)
const MAX_HIT_BONUS: f64 = 0.5;

/// Chance that a TLB miss is also counted as a page fault
const FAULT_ON_MISS_PROBABILITY: f64 = 0.3;

/// Synthetic access statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct AccessCounters {
    total_accesses: u64,
    page_faults: u64,
    tlb_hits: u64,
    tlb_misses: u64,
}

/// Lock-protected part of the manager
struct PagePool {
    pages: Vec<MemoryPage>,
    counters: AccessCounters,
    rng: StdRng,
}

impl PagePool {
    fn allocated_pages(&self) -> usize {
        self.pages.iter().filter(|page| page.is_allocated()).count()
    }

    fn pages_owned_by(&self, pid: ProcessId) -> usize {
        self.pages.iter().filter(|page| page.is_owned_by(pid)).count()
    }
}

/// The simulated paged allocator
pub struct MemoryManager {
    total_memory: usize,
    page_size: usize,
    pool: Mutex<PagePool>,
}

impl MemoryManager {
    /// Create a manager with an entropy-seeded access simulator
    ///
    /// Fails if either size is zero or `total_memory` is not a whole number
    /// of pages.
    pub fn new(total_memory: usize, page_size: usize) -> Result<Self, MemoryError> {
        Self::build(total_memory, page_size, StdRng::from_os_rng())
    }

    /// Create a manager whose access simulation is reproducible
    pub fn with_seed(total_memory: usize, page_size: usize, seed: u64) -> Result<Self, MemoryError> {
        Self::build(total_memory, page_size, StdRng::seed_from_u64(seed))
    }

    fn build(total_memory: usize, page_size: usize, rng: StdRng) -> Result<Self, MemoryError> {
        if page_size == 0 {
            return Err(MemoryError::ZeroPageSize);
        }
        if total_memory == 0 {
            return Err(MemoryError::ZeroTotalMemory);
        }
        if total_memory % page_size != 0 {
            return Err(MemoryError::Misaligned {
                total: total_memory,
                page_size,
            });
        }

        let page_count = total_memory / page_size;
        let pages = (0..page_count).map(MemoryPage::new).collect();

        log::info!(
            "[Memory] Page pool ready: {} pages x {} = {} total",
            page_count,
            page_size,
            total_memory
        );

        Ok(Self {
            total_memory,
            page_size,
            pool: Mutex::new(PagePool {
                pages,
                counters: AccessCounters::default(),
                rng,
            }),
        })
    }

    pub fn total_memory(&self) -> usize {
        self.total_memory
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.total_memory / self.page_size
    }

    /// Pages needed to hold `amount`, rounding up
    pub fn pages_needed(&self, amount: usize) -> usize {
        amount.div_ceil(self.page_size)
    }

    /// Grant `amount` of memory to `process`
    ///
    /// Scans the pool in index order collecting free pages. If fewer than
    /// `pages_needed(amount)` are free nothing changes and OutOfMemory is
    /// returned. On success the process's allocated memory becomes its page
    /// count times the page size, which may exceed `amount`.
    ///
    /// # Returns
    /// The process's allocated memory after the grant
    pub fn allocate(&self, process: &mut Process, amount: usize) -> Result<usize, MemoryError> {
        let needed = self.pages_needed(amount);
        let mut pool = self.pool.lock();

        let free: Vec<usize> = pool
            .pages
            .iter()
            .filter(|page| !page.is_allocated())
            .map(MemoryPage::index)
            .take(needed)
            .collect();

        if free.len() < needed {
            let free_pages = pool.pages.len() - pool.allocated_pages();
            log::warn!(
                "[Memory] PID {} ({}) wants {} pages, only {} free",
                process.id(),
                process.name(),
                needed,
                free_pages
            );
            return Err(MemoryError::OutOfMemory {
                requested_pages: needed,
                free_pages,
            });
        }

        for index in free {
            pool.pages[index].assign(process.id());
        }
        let granted = pool.pages_owned_by(process.id()) * self.page_size;
        process.set_allocated_memory(granted);

        log::debug!(
            "[Memory] PID {} granted {} pages ({} for {} requested)",
            process.id(),
            needed,
            granted,
            amount
        );
        Ok(granted)
    }

    /// Release every page `process` owns and zero its allocation
    ///
    /// Freeing a process that owns nothing is a no-op.
    ///
    /// # Returns
    /// Number of pages released
    pub fn free(&self, process: &mut Process) -> usize {
        let mut pool = self.pool.lock();
        let mut released = 0;
        for page in pool.pages.iter_mut().filter(|page| page.is_owned_by(process.id())) {
            page.release();
            released += 1;
        }
        process.set_allocated_memory(0);

        if released > 0 {
            log::debug!("[Memory] PID {} released {} pages", process.id(), released);
        }
        released
    }

    /// Memory held by processes, counted from the pool on each call
    pub fn used_memory(&self) -> usize {
        self.pool.lock().allocated_pages() * self.page_size
    }

    pub fn free_memory(&self) -> usize {
        self.total_memory - self.used_memory()
    }

    pub fn free_pages(&self) -> usize {
        self.free_memory() / self.page_size
    }

    pub fn pages_owned_by(&self, pid: ProcessId) -> usize {
        self.pool.lock().pages_owned_by(pid)
    }

    /// Owner of every page, in index order
    pub fn page_owners(&self) -> Vec<Option<ProcessId>> {
        self.pool.lock().pages.iter().map(MemoryPage::owner).collect()
    }

    /// Simulate one memory access by `process`
    ///
    /// Purely cosmetic telemetry. The TLB hit chance is
    /// `0.4 + min(allocated / total, 0.5)`; a miss is also a page fault with
    /// probability 0.3. The process's pages are marked accessed.
    pub fn simulate_access(&self, process: &Process) {
        let share = process.allocated_memory() as f64 / self.total_memory as f64;
        let hit_probability = BASE_HIT_PROBABILITY + share.min(MAX_HIT_BONUS);

        let mut pool = self.pool.lock();
        let pool = &mut *pool;
        pool.counters.total_accesses += 1;

        for page in pool.pages.iter_mut().filter(|page| page.is_owned_by(process.id())) {
            page.mark_accessed();
        }

        if pool.rng.random::<f64>() < hit_probability {
            pool.counters.tlb_hits += 1;
            return;
        }

        pool.counters.tlb_misses += 1;
        if pool.rng.random_bool(FAULT_ON_MISS_PROBABILITY) {
            pool.counters.page_faults += 1;
        }
    }

    pub fn total_accesses(&self) -> u64 {
        self.pool.lock().counters.total_accesses
    }

    pub fn page_faults(&self) -> u64 {
        self.pool.lock().counters.page_faults
    }

    pub fn tlb_hits(&self) -> u64 {
        self.pool.lock().counters.tlb_hits
    }

    pub fn tlb_misses(&self) -> u64 {
        self.pool.lock().counters.tlb_misses
    }

    /// Consistent snapshot of the pool and counters, taken under one lock
    pub fn stats(&self) -> MemoryStats {
        let pool = self.pool.lock();
        let used = pool.allocated_pages() * self.page_size;
        let pages = pool
            .pages
            .iter()
            .map(|page| PageInfo {
                index: page.index(),
                owner: page.owner(),
                accessed: page.flags().contains(super::PageFlags::ACCESSED),
            })
            .collect();

        MemoryStats {
            total: self.total_memory,
            used,
            free: self.total_memory - used,
            page_size: self.page_size,
            page_count: pool.pages.len(),
            pages,
            total_accesses: pool.counters.total_accesses,
            page_faults: pool.counters.page_faults,
            tlb_hits: pool.counters.tlb_hits,
            tlb_misses: pool.counters.tlb_misses,
        }
    }
}

impl core::fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("total_memory", &self.total_memory)
            .field("page_size", &self.page_size)
            .field("used_memory", &self.used_memory())
            .finish()
    }
}
