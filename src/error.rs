//! Error taxonomy for device memory operations.
//!
//! Two recoverable failure channels: allocation failure and mem-info query
//! failure. They are distinct types so callers can apply different fallback
//! policies (an out-of-memory retry loop has nothing to do with a broken
//! capacity probe). A rejected deallocation is deliberately *not* an error
//! value — it always signals a prior bug (double free, mismatched resource,
//! corrupted handle) and surfaces as a panic in the backend instead.

use thiserror::Error;

use crate::platform::{PlatformError, CODE_OUT_OF_MEMORY};

/// Failure of an allocation request. Never retried internally; surfaced
/// synchronously at the `allocate` call that triggered it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The platform could not find `requested` bytes of free device memory.
    /// Recoverable by caller policy (free something, shrink, fall back).
    #[error("out of device memory: {requested} bytes requested (driver code {code})")]
    OutOfMemory { requested: usize, code: i32 },

    /// The platform rejected the request for a reason other than
    /// exhaustion, e.g. an invalid size.
    #[error("device allocation of {requested} bytes failed with driver code {code}")]
    Platform { requested: usize, code: i32 },
}

impl AllocError {
    pub(crate) fn from_platform(requested: usize, err: PlatformError) -> Self {
        if err.code == CODE_OUT_OF_MEMORY {
            AllocError::OutOfMemory {
                requested,
                code: err.code,
            }
        } else {
            AllocError::Platform {
                requested,
                code: err.code,
            }
        }
    }

    /// Whether this failure is memory exhaustion, the one case worth a
    /// caller-side retry after releasing memory.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, AllocError::OutOfMemory { .. })
    }
}

/// Failure of a free/total capacity query.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemInfoError {
    /// The platform could not report memory status.
    #[error("device memory info query failed with driver code {code}")]
    Platform { code: i32 },

    /// The resource reports `supports_get_mem_info() == false`.
    #[error("memory info is not supported by this resource")]
    Unsupported,
}
