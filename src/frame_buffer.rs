use std::collections::VecDeque;

use crate::error::{FusionError, Result};

/// Fixed-capacity history of the most recent frames. The oldest entry is
/// overwritten once the buffer is full.
#[derive(Debug, Clone)]
pub struct FrameBuffer<T> {
    frames: VecDeque<T>,
    capacity: usize,
}

impl<T> FrameBuffer<T> {
    /// Two frames are the minimum needed for any TTC estimate.
    pub const MIN_CAPACITY: usize = 2;

    pub fn new(capacity: usize) -> Result<FrameBuffer<T>> {
        if capacity < Self::MIN_CAPACITY {
            return Err(FusionError::InvalidConfig(format!(
                "frame buffer capacity must be at least {}, got {}",
                Self::MIN_CAPACITY,
                capacity
            )));
        }
        Ok(FrameBuffer {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    pub fn push(&mut self, frame: T) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn current(&self) -> Option<&T> {
        self.frames.back()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.frames.back_mut()
    }

    pub fn previous(&self) -> Option<&T> {
        let len = self.frames.len();
        if len < 2 {
            return None;
        }
        self.frames.get(len - 2)
    }

    /// Previous frame for reading alongside the current frame for writing.
    pub fn latest_pair_mut(&mut self) -> Option<(&T, &mut T)> {
        let len = self.frames.len();
        if len < 2 {
            return None;
        }
        let frames = self.frames.make_contiguous();
        let (head, tail) = frames.split_at_mut(len - 1);
        Some((&head[len - 2], &mut tail[0]))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.frames.iter()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
