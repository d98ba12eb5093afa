//! Pass-through device memory resource.
//!
//! Forwards every operation straight to the platform allocator: one driver
//! call per allocate/free, no pooling, no caching, no retry, no stream
//! awareness. This is the backend every allocator composition bottoms out
//! in.

use std::any::Any;

use tracing::trace;

use crate::error::{AllocError, MemInfoError};
use crate::platform;
use crate::resource::{DeviceMemoryResource, DevicePtr, MemInfo};
use crate::stream::StreamView;

/// Stateless pass-through resource over the platform allocator.
///
/// The platform allocator is a single global heap, so every
/// `DirectResource` value fronts the same memory: any two instances compare
/// equal and may free each other's allocations. The type is an empty
/// `Copy` value; construction and destruction do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectResource;

impl DirectResource {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceMemoryResource for DirectResource {
    /// Streams are accepted for interface uniformity but ignored.
    fn supports_streams(&self) -> bool {
        false
    }

    fn supports_get_mem_info(&self) -> bool {
        true
    }

    fn allocate(&self, size: usize, _stream: StreamView) -> Result<DevicePtr, AllocError> {
        if size == 0 {
            // The platform allocator succeeds without allocating for
            // zero-byte requests; mirror that without a driver call.
            return Ok(DevicePtr::dangling());
        }

        let raw = platform::malloc(size).map_err(|err| AllocError::from_platform(size, err))?;
        let ptr = DevicePtr::new(raw);
        trace!(size, ptr = ?ptr, "allocated device memory");
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: DevicePtr, size: usize, _stream: StreamView) {
        if size == 0 {
            return;
        }

        // A rejected free always means a prior bug (double free, wrong
        // size, foreign pointer); there is no recovery strategy, so treat
        // it as fatal.
        if let Err(err) = platform::free(ptr.as_non_null(), size) {
            panic!("device free of {size} bytes at {ptr:?} rejected: {err}");
        }
        trace!(size, ptr = ?ptr, "freed device memory");
    }

    fn is_equal(&self, other: &dyn DeviceMemoryResource) -> bool {
        // Same global heap behind every instance, so type identity is the
        // whole comparison.
        other.as_any().is::<DirectResource>()
    }

    fn get_mem_info(&self, _stream: StreamView) -> Result<MemInfo, MemInfoError> {
        let (free, total) =
            platform::mem_get_info().map_err(|err| MemInfoError::Platform { code: err.code })?;
        Ok(MemInfo { free, total })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
