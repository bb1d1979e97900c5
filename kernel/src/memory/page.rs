/*
 * Simulated Memory Page
 *
 * One fixed-size slot of the simulated page pool. A page records who holds
 * it (by PID, never by reference) and a couple of status bits.
 */

use bitflags::bitflags;

use crate::scheduler::ProcessId;

bitflags! {
    /// Page status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PageFlags: u8 {
        /// Page is owned by a process
        const ALLOCATED = 1;
        /// Owner touched the page since it was granted
        const ACCESSED = 1 << 1;
        // 2 to 7 are unused
    }
}

/// A page of the simulated pool
///
/// Pages are created once with the manager and never destroyed; only their
/// owner toggles between a PID and None.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPage {
    index: usize,
    owner: Option<ProcessId>,
    flags: PageFlags,
}

impl MemoryPage {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            owner: None,
            flags: PageFlags::empty(),
        }
    }

    /// Position in the pool (0..page_count)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn owner(&self) -> Option<ProcessId> {
        self.owner
    }

    pub fn flags(&self) -> PageFlags {
        self.flags
    }

    pub fn is_allocated(&self) -> bool {
        self.flags.contains(PageFlags::ALLOCATED)
    }

    pub fn is_owned_by(&self, pid: ProcessId) -> bool {
        self.owner == Some(pid)
    }

    /// Hand the page to `pid`, resetting status bits
    pub fn assign(&mut self, pid: ProcessId) {
        self.owner = Some(pid);
        self.flags = PageFlags::ALLOCATED;
    }

    /// Return the page to the free pool
    pub fn release(&mut self) {
        self.owner = None;
        self.flags = PageFlags::empty();
    }

    pub fn mark_accessed(&mut self) {
        if self.is_allocated() {
            self.flags.insert(PageFlags::ACCESSED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_release_toggle_ownership() {
        let mut page = MemoryPage::new(3);
        assert!(!page.is_allocated());
        assert_eq!(page.owner(), None);

        page.assign(ProcessId(9));
        page.mark_accessed();
        assert!(page.is_owned_by(ProcessId(9)));
        assert_eq!(page.flags(), PageFlags::ALLOCATED | PageFlags::ACCESSED);

        page.release();
        assert_eq!(page.owner(), None);
        assert_eq!(page.flags(), PageFlags::empty());
        assert_eq!(page.index(), 3);
    }

    #[test]
    fn free_page_cannot_be_marked_accessed() {
        let mut page = MemoryPage::new(0);
        page.mark_accessed();
        assert!(page.flags().is_empty());
    }
}
