//! RAII ownership of a single device allocation.
//!
//! `DeviceBuffer` pairs one allocation with the resource that produced it:
//! it allocates in the constructor and frees through the same resource on
//! drop, so callers never hand sizes and pointers around by hand. The
//! memory is untyped and uninitialized.

use std::fmt;
use std::sync::Arc;

use crate::error::AllocError;
use crate::resource::{DeviceMemoryResource, DevicePtr};
use crate::stream::StreamView;

/// Owning handle to one block of device memory.
///
/// The resource is held behind `Arc<dyn DeviceMemoryResource>` so the
/// buffer can outlive the binding that created it and so buffers are freely
/// movable across threads.
pub struct DeviceBuffer {
    ptr: DevicePtr,
    size: usize,
    stream: StreamView,
    mr: Arc<dyn DeviceMemoryResource>,
}

impl DeviceBuffer {
    /// Allocate `size` uninitialized bytes from `mr`.
    ///
    /// `stream` is recorded and reused for the deallocation on drop; for a
    /// stream-unaware resource it is ignored on both ends.
    pub fn new(
        size: usize,
        stream: StreamView,
        mr: Arc<dyn DeviceMemoryResource>,
    ) -> Result<Self, AllocError> {
        let ptr = mr.allocate(size, stream)?;
        Ok(Self {
            ptr,
            size,
            stream,
            mr,
        })
    }

    /// Empty buffer bound to `mr`; performs no allocation.
    pub fn empty(stream: StreamView, mr: Arc<dyn DeviceMemoryResource>) -> Self {
        Self {
            ptr: DevicePtr::dangling(),
            size: 0,
            stream,
            mr,
        }
    }

    /// Device address of the buffer's memory.
    pub fn data(&self) -> DevicePtr {
        self.ptr
    }

    /// Size of the allocation in bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Stream the deallocation will be issued on.
    pub fn stream(&self) -> StreamView {
        self.stream
    }

    /// Change the stream used for the deallocation on drop. The caller is
    /// responsible for ordering between the old and new streams.
    pub fn set_stream(&mut self, stream: StreamView) {
        self.stream = stream;
    }

    /// The resource this buffer allocates from and frees through.
    pub fn memory_resource(&self) -> &Arc<dyn DeviceMemoryResource> {
        &self.mr
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        // Safety: ptr/size come from this resource's allocate and the
        // buffer is the allocation's sole owner.
        unsafe { self.mr.deallocate(self.ptr, self.size, self.stream) }
    }
}

impl fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("ptr", &self.ptr)
            .field("size", &self.size)
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direct::DirectResource;

    fn direct() -> Arc<dyn DeviceMemoryResource> {
        Arc::new(DirectResource::new())
    }

    #[test]
    fn test_new_allocates_aligned() {
        let buf = DeviceBuffer::new(1024, StreamView::DEFAULT, direct()).unwrap();
        assert_eq!(buf.len(), 1024);
        assert!(!buf.is_empty());
        assert!(buf.data().is_aligned_to(crate::resource::MIN_ALIGNMENT));
    }

    #[test]
    fn test_empty_buffer() {
        let buf = DeviceBuffer::empty(StreamView::DEFAULT, direct());
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_set_stream() {
        let mut buf = DeviceBuffer::new(64, StreamView::DEFAULT, direct()).unwrap();
        buf.set_stream(StreamView::from_raw(7));
        assert_eq!(buf.stream(), StreamView::from_raw(7));
    }
}
