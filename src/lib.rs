//! Device memory resource abstraction.
//!
//! A pluggable contract for accelerator memory allocators, plus the one
//! backend every allocator composition bottoms out in: a direct pass-through
//! to the platform allocator. Pooling, logging, and limiting layers are
//! built on top of the [`resource::DeviceMemoryResource`] trait by external
//! crates; this crate only defines the contract and the simplest backend.
//!
//! - [`resource`]: the `DeviceMemoryResource` contract and handle types
//! - [`direct`]: `DirectResource`, the pass-through backend
//! - [`buffer`]: RAII ownership of a single allocation
//! - [`stream`]: opaque execution stream views
//!
//! With the `cuda` feature enabled, platform calls go through the CUDA
//! driver. Without it, a host-simulated VRAM heap stands in, so the whole
//! crate is exercisable on CPU-only machines.

pub mod buffer;
pub mod direct;
pub mod error;
mod platform;
pub mod resource;
pub mod stream;

pub use buffer::DeviceBuffer;
pub use direct::DirectResource;
pub use error::{AllocError, MemInfoError};
pub use resource::{DeviceMemoryResource, DevicePtr, MemInfo, MIN_ALIGNMENT};
pub use stream::StreamView;
