//! The device memory resource contract.
//!
//! [`DeviceMemoryResource`] is the sole extension point for allocator
//! backends: pools, limiters, and logging layers all implement it and are
//! substituted behind `&dyn DeviceMemoryResource` without callers changing.
//! The contract carries no state of its own; whatever a backend needs
//! (free lists, upstream handles) lives in the concrete type.

use std::any::Any;
use std::fmt;
use std::ptr::NonNull;

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, MemInfoError};
use crate::stream::StreamView;

/// Minimum alignment, in bytes, guaranteed by the platform allocator and by
/// every pass-through allocation.
pub const MIN_ALIGNMENT: usize = 256;

/// Opaque device memory address returned by
/// [`DeviceMemoryResource::allocate`].
///
/// The pointee lives in device memory and must never be dereferenced on the
/// host. The handle does not carry the allocation size; callers hand the
/// original size back to `deallocate`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevicePtr(NonNull<u8>);

// A DevicePtr is an address value, never dereferenced on the host, so
// moving or sharing it across threads is sound.
unsafe impl Send for DevicePtr {}
unsafe impl Sync for DevicePtr {}

impl DevicePtr {
    pub(crate) fn new(ptr: NonNull<u8>) -> Self {
        Self(ptr)
    }

    /// Distinguished aligned pointer standing in for a zero-byte
    /// allocation. Never backed by device memory.
    pub(crate) fn dangling() -> Self {
        // MIN_ALIGNMENT is non-zero, so this address is too.
        Self(unsafe { NonNull::new_unchecked(MIN_ALIGNMENT as *mut u8) })
    }

    pub(crate) fn as_non_null(self) -> NonNull<u8> {
        self.0
    }

    /// Raw device address as a pointer value.
    pub fn as_raw(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Raw device address as an integer.
    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }

    /// Whether the address is aligned to `align` bytes.
    pub fn is_aligned_to(self, align: usize) -> bool {
        align > 0 && self.addr() % align == 0
    }
}

impl fmt::Debug for DevicePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevicePtr({:#x})", self.addr())
    }
}

/// Snapshot of device memory availability as reported by the platform.
///
/// This is a global, platform-wide view, not per-resource accounting: for
/// the pass-through backend it reflects everything allocated on the device,
/// including allocations made outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemInfo {
    /// Free device memory in bytes at query time.
    pub free: usize,

    /// Total device memory in bytes.
    pub total: usize,
}

impl MemInfo {
    /// Bytes currently in use on the device.
    pub fn used(&self) -> usize {
        self.total.saturating_sub(self.free)
    }
}

/// Capability contract every device memory allocator backend satisfies.
///
/// Equality between resources means interchangeability: `a.is_equal(&b)`
/// promises that memory allocated through `a` may be freed through `b`.
/// Implementations are expected to keep the relation symmetric.
///
/// All operations are synchronous and stateless at this layer; thread
/// safety reduces to the backend's own state (the trait requires
/// `Send + Sync` so resources can be shared across threads).
pub trait DeviceMemoryResource: Send + Sync {
    /// Whether allocate/deallocate honor stream ordering. A resource
    /// returning `false` ignores every stream argument and its operations
    /// are synchronous with respect to the caller.
    fn supports_streams(&self) -> bool;

    /// Whether [`get_mem_info`](Self::get_mem_info) is meaningful for this
    /// resource type.
    fn supports_get_mem_info(&self) -> bool;

    /// Allocate at least `size` bytes of device memory, aligned to the
    /// resource's minimum (at least [`MIN_ALIGNMENT`] for the pass-through
    /// backend).
    ///
    /// Out-of-memory comes back as [`AllocError::OutOfMemory`], distinct
    /// from other platform errors, so callers can implement fallback
    /// policies.
    fn allocate(&self, size: usize, stream: StreamView) -> Result<DevicePtr, AllocError>;

    /// Release memory previously returned by `allocate` on a resource that
    /// compares equal to this one.
    ///
    /// A free rejected by the platform is a fatal invariant violation and
    /// panics; there is no recoverable failure mode here.
    ///
    /// # Safety
    /// `ptr` must have been returned by `allocate` on this resource or one
    /// equal to it, `size` must equal the originating request, the
    /// allocation must not already have been freed, and no pending device
    /// work may still reference the memory.
    unsafe fn deallocate(&self, ptr: DevicePtr, size: usize, stream: StreamView);

    /// Interchangeability comparison, not identity. See the trait-level
    /// docs for the contract.
    fn is_equal(&self, other: &dyn DeviceMemoryResource) -> bool;

    /// Current `(free, total)` device memory as observed by the platform.
    fn get_mem_info(&self, stream: StreamView) -> Result<MemInfo, MemInfoError>;

    /// Dynamic-type hook used by `is_equal` implementations to recognize
    /// compatible concrete types.
    fn as_any(&self) -> &dyn Any;
}
