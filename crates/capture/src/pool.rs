//! Fixed frame-buffer pool implementing [`BufferRing`].
//!
//! The pool carves a caller-provided region (a `'static` `.axisram` array
//! on hardware, a `Vec` in tests) into `N` equal buffers. Completed frames
//! queue in FIFO order; when the producer needs a buffer and none is free,
//! the oldest completed frame is recycled as long as a newer one remains.

use heapless::{Deque, Vec};
use platform::dma_safety::CACHE_LINE_BYTES;
use platform::{BufferHandle, BufferRing, ReadFlags, VBuffer};

/// Ownership state of one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// Available to the producer.
    Free,
    /// Held by the producer.
    Writing,
    /// Completed, queued for the consumer.
    Ready,
    /// Held by the consumer.
    Reading,
}

struct Slot<'a> {
    buf: VBuffer<&'a mut [u8]>,
    state: SlotState,
}

/// Pool of `N` frame buffers.
pub struct FramePool<'a, const N: usize> {
    slots: Vec<Slot<'a>, N>,
    ready: Deque<u8, N>,
    writing: Option<u8>,
    capacity: usize,
    invalidations: u32,
}

impl<'a, const N: usize> FramePool<'a, N> {
    /// Split `memory` into `N` buffers, each rounded down to a whole number
    /// of cache lines. `None` if that leaves no room, or `N` does not fit a
    /// handle.
    pub fn new(memory: &'a mut [u8]) -> Option<Self> {
        let per_buffer = memory.len().checked_div(N)?;
        let capacity = per_buffer
            .checked_div(CACHE_LINE_BYTES)?
            .checked_mul(CACHE_LINE_BYTES)?;
        if capacity == 0 || N > usize::from(u8::MAX) {
            return None;
        }
        let mut slots = Vec::new();
        for chunk in memory.chunks_exact_mut(capacity).take(N) {
            slots
                .push(Slot {
                    buf: VBuffer::new(chunk),
                    state: SlotState::Free,
                })
                .ok()?;
        }
        Some(Self {
            slots,
            ready: Deque::new(),
            writing: None,
            capacity,
            invalidations: 0,
        })
    }

    /// Number of buffers.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` when the pool holds no buffers.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// State of the buffer behind `handle`.
    pub fn state(&self, handle: BufferHandle) -> Option<SlotState> {
        self.slots.get(handle.index()).map(|s| s.state)
    }

    /// Reads that requested cache invalidation.
    pub fn invalidations(&self) -> u32 {
        self.invalidations
    }

    fn start_writing(&mut self, index: u8) -> Option<BufferHandle> {
        let slot = self.slots.get_mut(usize::from(index))?;
        slot.state = SlotState::Writing;
        slot.buf.reset();
        self.writing = Some(index);
        Some(BufferHandle::new(index))
    }

    fn free_slot(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.state = SlotState::Free;
            slot.buf.reset();
        }
    }
}

impl<'a, const N: usize> BufferRing for FramePool<'a, N> {
    type Storage = &'a mut [u8];

    fn acquire_write(&mut self) -> Option<BufferHandle> {
        if let Some(index) = self.writing {
            return Some(BufferHandle::new(index));
        }
        let free = self
            .slots
            .iter()
            .position(|s| s.state == SlotState::Free)
            .and_then(|i| u8::try_from(i).ok());
        if let Some(index) = free {
            return self.start_writing(index);
        }
        if self.ready.len() >= 2 {
            let oldest = self.ready.pop_front()?;
            return self.start_writing(oldest);
        }
        None
    }

    fn acquire_read(&mut self, flags: ReadFlags) -> Option<BufferHandle> {
        let index = self.ready.pop_front()?;
        let slot = self.slots.get_mut(usize::from(index))?;
        slot.state = SlotState::Reading;
        if flags.contains(ReadFlags::INVALIDATE) {
            self.invalidations = self.invalidations.saturating_add(1);
        }
        Some(BufferHandle::new(index))
    }

    fn complete_write(&mut self, handle: BufferHandle) -> bool {
        let Ok(index) = u8::try_from(handle.index()) else {
            return false;
        };
        if self.writing != Some(index) {
            return false;
        }
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if self.ready.push_back(index).is_err() {
            return false;
        }
        slot.state = SlotState::Ready;
        self.writing = None;
        true
    }

    fn release(&mut self, handle: BufferHandle) {
        match self.state(handle) {
            Some(SlotState::Writing) => {
                self.writing = None;
                self.free_slot(handle.index());
            }
            Some(SlotState::Reading) => self.free_slot(handle.index()),
            _ => {}
        }
    }

    fn flush_all(&mut self, hard: bool) {
        while let Some(index) = self.ready.pop_front() {
            self.free_slot(usize::from(index));
        }
        if hard {
            if let Some(index) = self.writing.take() {
                self.free_slot(usize::from(index));
            }
        }
    }

    fn buffer_capacity(&self) -> usize {
        self.capacity
    }

    fn buffer(&self, handle: BufferHandle) -> Option<&VBuffer<Self::Storage>> {
        self.slots.get(handle.index()).map(|s| &s.buf)
    }

    fn buffer_mut(&mut self, handle: BufferHandle) -> Option<&mut VBuffer<Self::Storage>> {
        self.slots.get_mut(handle.index()).map(|s| &mut s.buf)
    }

    fn free_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Free)
            .count()
    }

    fn ready_count(&self) -> usize {
        self.ready.len()
    }
}

impl<const N: usize> core::fmt::Debug for FramePool<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FramePool")
            .field("buffers", &self.slots.len())
            .field("capacity", &self.capacity)
            .field("free", &self.free_count())
            .field("ready", &self.ready.len())
            .field("writing", &self.writing)
            .finish()
    }
}
