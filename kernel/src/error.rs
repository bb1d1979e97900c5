/*
 * Kernel Errors
 *
 * Failures surfaced by the kernel's public operations. Unknown PIDs are not
 * errors: lookups return None and kills report false.
 */

use crate::memory::MemoryError;

/// Errors returned by OsKernel construction and process creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// The memory manager refused: bad geometry at construction, or not
    /// enough free pages at process creation
    Memory(MemoryError),
    /// A configuration value is out of range
    InvalidConfig(&'static str),
    /// Every PID above the configured base has been handed out
    PidsExhausted,
}

impl KernelError {
    /// Whether this is the recoverable "not enough memory" rejection
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, KernelError::Memory(MemoryError::OutOfMemory { .. }))
    }
}

impl core::fmt::Display for KernelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KernelError::Memory(err) => write!(f, "{}", err),
            KernelError::InvalidConfig(reason) => write!(f, "Invalid configuration: {}", reason),
            KernelError::PidsExhausted => write!(f, "No process IDs left"),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Memory(err) => Some(err),
            KernelError::InvalidConfig(_) | KernelError::PidsExhausted => None,
        }
    }
}

impl From<MemoryError> for KernelError {
    fn from(err: MemoryError) -> Self {
        KernelError::Memory(err)
    }
}
