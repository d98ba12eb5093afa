//! Raw platform allocator primitives.
//!
//! With the `cuda` feature enabled, forwards to the CUDA driver through
//! `cudarc`. Without it, a host-simulated VRAM heap stands in so the crate
//! runs on CPU-only machines: allocations come from host memory at the same
//! 256-byte alignment, and the heap tracks live pointers so a double free,
//! a wrong-size free, or a foreign pointer is reported as an error instead
//! of corrupting anything.

use thiserror::Error;

/// Failure reported by the platform allocator, carrying the driver status
/// code so callers can tell exhaustion apart from other errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("driver code {code}")]
pub(crate) struct PlatformError {
    pub(crate) code: i32,
}

/// Driver status codes shared by both backends (CUDA numbering).
pub(crate) const CODE_INVALID_VALUE: i32 = 1;
pub(crate) const CODE_OUT_OF_MEMORY: i32 = 2;

#[cfg(feature = "cuda")]
pub(crate) use cuda::{free, malloc, mem_get_info};
#[cfg(not(feature = "cuda"))]
pub(crate) use host::{free, malloc, mem_get_info};

/// CUDA driver backend.
///
/// The caller is responsible for binding a CUDA context to the calling
/// thread before use (e.g. `cudarc::driver::CudaContext::new`).
#[cfg(feature = "cuda")]
mod cuda {
    use std::ptr::NonNull;

    use cudarc::driver::result as driver;

    use super::PlatformError;

    fn platform_err(err: cudarc::driver::DriverError) -> PlatformError {
        PlatformError { code: err.0 as i32 }
    }

    /// One `cuMemAlloc` call. `size` must be non-zero.
    pub(crate) fn malloc(size: usize) -> Result<NonNull<u8>, PlatformError> {
        // Safety: allocating never aliases existing memory; the handle is
        // returned untouched.
        let dptr = unsafe { driver::malloc_sync(size) }.map_err(platform_err)?;
        NonNull::new(dptr as *mut u8).ok_or(PlatformError {
            code: super::CODE_INVALID_VALUE,
        })
    }

    /// One `cuMemFree` call.
    ///
    /// # Safety
    /// `ptr` must be a live device allocation of `size` bytes returned by
    /// [`malloc`], with no pending device work referencing it.
    pub(crate) unsafe fn free(ptr: NonNull<u8>, _size: usize) -> Result<(), PlatformError> {
        unsafe { driver::free_sync(ptr.as_ptr() as u64) }.map_err(platform_err)
    }

    /// One `cuMemGetInfo` call: `(free_bytes, total_bytes)`.
    pub(crate) fn mem_get_info() -> Result<(usize, usize), PlatformError> {
        driver::mem_get_info().map_err(platform_err)
    }
}

/// Host-simulated VRAM heap for CPU-only builds.
#[cfg(not(feature = "cuda"))]
mod host {
    use std::alloc::{alloc, dealloc, Layout};
    use std::collections::HashMap;
    use std::ptr::NonNull;
    use std::sync::{LazyLock, Mutex};

    use super::{PlatformError, CODE_INVALID_VALUE, CODE_OUT_OF_MEMORY};
    use crate::resource::MIN_ALIGNMENT;

    /// Simulated VRAM capacity, sized after the 8 GB cards in the target
    /// cluster.
    const STUB_VRAM_BYTES: usize = 8 * 1024 * 1024 * 1024;

    struct StubHeap {
        used: usize,

        /// Live allocations, pointer address to size.
        live: HashMap<usize, usize>,
    }

    static HEAP: LazyLock<Mutex<StubHeap>> = LazyLock::new(|| {
        Mutex::new(StubHeap {
            used: 0,
            live: HashMap::new(),
        })
    });

    /// Carve `size` bytes out of the simulated heap. `size` must be
    /// non-zero.
    pub(crate) fn malloc(size: usize) -> Result<NonNull<u8>, PlatformError> {
        debug_assert!(size > 0);

        let layout = Layout::from_size_align(size, MIN_ALIGNMENT).map_err(|_| PlatformError {
            code: CODE_INVALID_VALUE,
        })?;

        let mut heap = HEAP.lock().expect("stub VRAM heap poisoned");
        if size > STUB_VRAM_BYTES - heap.used {
            return Err(PlatformError {
                code: CODE_OUT_OF_MEMORY,
            });
        }

        // Safety: size is non-zero and the layout is valid.
        let raw = unsafe { alloc(layout) };
        let ptr = NonNull::new(raw).ok_or(PlatformError {
            code: CODE_OUT_OF_MEMORY,
        })?;

        heap.used += size;
        heap.live.insert(ptr.as_ptr() as usize, size);
        Ok(ptr)
    }

    /// Return an allocation to the simulated heap.
    ///
    /// Unlike a real driver, the stub can actually verify the free: an
    /// unknown pointer or a size that does not match the originating
    /// allocation comes back as an invalid-value error.
    ///
    /// # Safety
    /// If `ptr`/`size` match a live allocation, the caller must be its sole
    /// owner; the memory is released before this returns.
    pub(crate) unsafe fn free(ptr: NonNull<u8>, size: usize) -> Result<(), PlatformError> {
        let mut heap = HEAP.lock().expect("stub VRAM heap poisoned");
        let addr = ptr.as_ptr() as usize;

        match heap.live.remove(&addr) {
            Some(live_size) if live_size == size => {
                heap.used -= size;
                let layout = Layout::from_size_align(size, MIN_ALIGNMENT)
                    .map_err(|_| PlatformError {
                        code: CODE_INVALID_VALUE,
                    })?;
                // Safety: ptr was produced by `alloc` with this exact layout
                // and was still registered as live.
                unsafe { dealloc(ptr.as_ptr(), layout) };
                Ok(())
            }
            Some(live_size) => {
                // Size mismatch: keep the allocation registered and reject
                // the free.
                heap.live.insert(addr, live_size);
                Err(PlatformError {
                    code: CODE_INVALID_VALUE,
                })
            }
            None => Err(PlatformError {
                code: CODE_INVALID_VALUE,
            }),
        }
    }

    /// `(free_bytes, total_bytes)` of the simulated heap.
    pub(crate) fn mem_get_info() -> Result<(usize, usize), PlatformError> {
        let heap = HEAP.lock().expect("stub VRAM heap poisoned");
        Ok((STUB_VRAM_BYTES - heap.used, STUB_VRAM_BYTES))
    }
}

#[cfg(all(test, not(feature = "cuda")))]
mod tests {
    use std::ptr::NonNull;

    use super::*;

    #[test]
    fn test_malloc_free_round_trip() {
        let ptr = malloc(4096).unwrap();
        assert_eq!(ptr.as_ptr() as usize % crate::resource::MIN_ALIGNMENT, 0);
        unsafe { free(ptr, 4096).unwrap() };
    }

    #[test]
    fn test_free_unknown_pointer_rejected() {
        let bogus = NonNull::new(0x1000 as *mut u8).unwrap();
        let err = unsafe { free(bogus, 64) }.unwrap_err();
        assert_eq!(err.code, CODE_INVALID_VALUE);
    }

    #[test]
    fn test_free_size_mismatch_keeps_allocation_live() {
        let ptr = malloc(512).unwrap();

        let err = unsafe { free(ptr, 256) }.unwrap_err();
        assert_eq!(err.code, CODE_INVALID_VALUE);

        // The correct size still frees it.
        unsafe { free(ptr, 512).unwrap() };
    }

    #[test]
    fn test_exhaustion_reported_as_oom() {
        let (_, total) = mem_get_info().unwrap();
        let err = malloc(total + 1).unwrap_err();
        assert_eq!(err.code, CODE_OUT_OF_MEMORY);
    }
}
