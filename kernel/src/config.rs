/*
 * Kernel Configuration
 *
 * Everything an OsKernel needs at construction: pool geometry, initial
 * scheduling policy, PID numbering and an optional RNG seed for
 * reproducible runs.
 */

use crate::error::KernelError;
use crate::memory::MemoryError;
use crate::scheduler::{SchedulingAlgorithm, TimeQuantum};

/// Default simulated memory (units are whatever the UI labels them, "MB")
pub const DEFAULT_TOTAL_MEMORY: usize = 1024;

/// Default page size
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// First PID handed out; 0 is the idle marker
pub const DEFAULT_PID_BASE: u32 = 1;

/// OsKernel construction parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    pub total_memory: usize,
    pub page_size: usize,
    pub algorithm: SchedulingAlgorithm,
    pub time_quantum: TimeQuantum,
    pub pid_base: u32,
    /// Seeds the access simulator and memory fluctuation; None draws from the OS
    pub rng_seed: Option<u64>,
}

impl KernelConfig {
    pub fn with_memory(mut self, total_memory: usize, page_size: usize) -> Self {
        self.total_memory = total_memory;
        self.page_size = page_size;
        self
    }

    pub fn with_algorithm(mut self, algorithm: SchedulingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Quantum in ticks, clamped to at least one
    pub fn with_time_quantum(mut self, ticks: u32) -> Self {
        self.time_quantum = TimeQuantum::new(ticks);
        self
    }

    pub fn with_pid_base(mut self, pid_base: u32) -> Self {
        self.pid_base = pid_base;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Check the values before any subsystem is built
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.page_size == 0 {
            return Err(MemoryError::ZeroPageSize.into());
        }
        if self.total_memory == 0 {
            return Err(MemoryError::ZeroTotalMemory.into());
        }
        if self.total_memory % self.page_size != 0 {
            return Err(MemoryError::Misaligned {
                total: self.total_memory,
                page_size: self.page_size,
            }
            .into());
        }
        if self.pid_base == 0 {
            return Err(KernelError::InvalidConfig("PID base must be positive, 0 is the idle PID"));
        }
        Ok(())
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            total_memory: DEFAULT_TOTAL_MEMORY,
            page_size: DEFAULT_PAGE_SIZE,
            algorithm: SchedulingAlgorithm::RoundRobin,
            time_quantum: TimeQuantum::DEFAULT,
            pid_base: DEFAULT_PID_BASE,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = KernelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_memory / config.page_size, 16);
        assert_eq!(config.time_quantum.get(), 3);
    }

    #[test]
    fn rejects_zero_pid_base() {
        let config = KernelConfig::default().with_pid_base(0);
        assert!(matches!(config.validate(), Err(KernelError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_misaligned_pool() {
        let config = KernelConfig::default().with_memory(1000, 64);
        assert_eq!(
            config.validate(),
            Err(KernelError::Memory(MemoryError::Misaligned {
                total: 1000,
                page_size: 64
            }))
        );
    }

    #[test]
    fn quantum_builder_clamps() {
        assert_eq!(KernelConfig::default().with_time_quantum(0).time_quantum.get(), 1);
    }
}
