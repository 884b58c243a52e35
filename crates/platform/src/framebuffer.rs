//! Frame buffer ring contract
//!
//! The capture engine is the producer: it holds at most one buffer for
//! writing and hands it over with `complete_write`. The application is the
//! consumer: it takes the oldest completed buffer with `acquire_read` and
//! gives it back with `release`.
//!
//! ```text
//! Free ──acquire_write──▶ Writing ──complete_write──▶ Ready
//!  ▲                         │                          │
//!  └────release / flush──────┘          acquire_read ───┘
//!  ▲                                                    ▼
//!  └───────────────────release─────────────────────  Reading
//! ```

/// One frame buffer plus the per-frame capture state that travels with it.
#[derive(Debug)]
pub struct VBuffer<S> {
    data: S,
    /// Raw mode: source lines received. JPEG mode: bytes written.
    pub offset: usize,
    /// The next line restarts the frame (lazy reset after a partial frame).
    pub reset_state: bool,
    /// JPEG payload exceeded the buffer.
    pub jpeg_overflow: bool,
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> VBuffer<S> {
    /// Wrap storage as an empty buffer.
    pub const fn new(data: S) -> Self {
        Self {
            data,
            offset: 0,
            reset_state: false,
            jpeg_overflow: false,
        }
    }

    /// Whole backing storage.
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Whole backing storage, mutable.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    /// Storage size in bytes.
    pub fn capacity(&self) -> usize {
        self.data.as_ref().len()
    }

    /// The first `offset` bytes (the JPEG stream written so far).
    pub fn filled(&self) -> &[u8] {
        let data = self.data.as_ref();
        data.get(..self.offset).unwrap_or(data)
    }

    /// Clear capture state. Pixel data is left as is.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.reset_state = false;
        self.jpeg_overflow = false;
    }
}

/// Opaque index of a buffer inside a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferHandle(u8);

impl BufferHandle {
    /// Handle for slot `index`.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Slot index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Options for [`BufferRing::acquire_read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadFlags(u8);

impl ReadFlags {
    /// No options.
    pub const NONE: Self = Self(0);
    /// Invalidate the D-cache over the buffer before handing it out.
    pub const INVALIDATE: Self = Self(1);

    /// `true` when every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Fixed pool of frame buffers with producer and consumer roles.
pub trait BufferRing {
    /// Backing storage of each buffer.
    type Storage: AsRef<[u8]> + AsMut<[u8]>;

    /// Buffer for the producer. Returns the current writing buffer if one is
    /// already held, `None` when the pool is exhausted.
    fn acquire_write(&mut self) -> Option<BufferHandle>;

    /// Oldest completed buffer for the consumer.
    fn acquire_read(&mut self, flags: ReadFlags) -> Option<BufferHandle>;

    /// Move a writing buffer to the consumer side. `false` if `handle` was
    /// not writing.
    fn complete_write(&mut self, handle: BufferHandle) -> bool;

    /// Return a writing or reading buffer to the free list. Releasing a
    /// buffer that is neither is a no-op.
    fn release(&mut self, handle: BufferHandle);

    /// Free every completed buffer, plus the writing buffer when `hard`.
    /// Buffers held by the consumer are left alone.
    fn flush_all(&mut self, hard: bool);

    /// Size of each buffer in bytes.
    fn buffer_capacity(&self) -> usize;

    /// Shared access to a buffer.
    fn buffer(&self, handle: BufferHandle) -> Option<&VBuffer<Self::Storage>>;

    /// Exclusive access to a buffer.
    fn buffer_mut(&mut self, handle: BufferHandle) -> Option<&mut VBuffer<Self::Storage>>;

    /// Buffers available to `acquire_write`.
    fn free_count(&self) -> usize;

    /// Completed buffers waiting for the consumer.
    fn ready_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vbuffer_reset_keeps_data() {
        let mut vb = VBuffer::new([7u8; 8]);
        vb.offset = 5;
        vb.jpeg_overflow = true;
        vb.reset_state = true;
        vb.reset();
        assert_eq!(vb.offset, 0);
        assert!(!vb.jpeg_overflow);
        assert!(!vb.reset_state);
        assert_eq!(vb.data(), &[7u8; 8]);
    }

    #[test]
    fn test_filled_is_clamped() {
        let mut vb = VBuffer::new([1u8, 2, 3]);
        vb.offset = 2;
        assert_eq!(vb.filled(), &[1, 2]);
        vb.offset = 10;
        assert_eq!(vb.filled().len(), 3);
    }

    #[test]
    fn test_read_flags() {
        assert!(ReadFlags::INVALIDATE.contains(ReadFlags::INVALIDATE));
        assert!(!ReadFlags::NONE.contains(ReadFlags::INVALIDATE));
        assert!(ReadFlags::INVALIDATE.contains(ReadFlags::NONE));
    }
}
