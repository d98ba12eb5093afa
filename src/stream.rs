//! Opaque execution stream handles.
//!
//! Streams order device work: operations enqueued on the same stream run
//! in submission order. This crate only passes stream handles through to
//! resources that care about them; the pass-through backend ignores them.

/// View of an execution stream, or the default-stream sentinel.
///
/// A `StreamView` does not own the underlying stream; it is a plain handle
/// valid for as long as the caller keeps the stream alive. Resources whose
/// `supports_streams()` is `false` ignore the value entirely and every
/// operation is synchronous with respect to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamView(usize);

impl StreamView {
    /// The platform's default stream.
    pub const DEFAULT: StreamView = StreamView(0);

    /// Wrap a raw driver stream handle.
    pub fn from_raw(handle: usize) -> Self {
        Self(handle)
    }

    /// The raw driver handle, `0` for the default stream.
    pub fn raw(self) -> usize {
        self.0
    }

    /// Whether this is the default-stream sentinel.
    pub fn is_default(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sentinel() {
        assert!(StreamView::DEFAULT.is_default());
        assert!(StreamView::default().is_default());
        assert_eq!(StreamView::DEFAULT, StreamView::from_raw(0));
    }

    #[test]
    fn test_raw_round_trip() {
        let s = StreamView::from_raw(0xdead_b000);
        assert_eq!(s.raw(), 0xdead_b000);
        assert!(!s.is_default());
    }
}
