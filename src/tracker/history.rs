use crate::hand::Point2;

/// Length of both per-run histories (tracked points and dynamic-gesture votes).
pub const HISTORY_LEN: usize = 16;

/// Fixed-capacity ring buffer, oldest entry evicted first.
///
/// Storage is an inline array with an explicit head index; pushing never allocates.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    /// Index of the oldest entry.
    head: usize,
    len: usize,
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if N == 0 {
            return;
        }
        if self.len < N {
            self.data[(self.head + self.len) % N] = value;
            self.len += 1;
        } else {
            self.data[self.head] = value;
            self.head = (self.head + 1) % N;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |i| self.data[(self.head + i) % N])
    }

    pub fn newest(&self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            Some(self.data[(self.head + self.len - 1) % N])
        }
    }
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame tracked fingertip (or `(0,0)` placeholder) trajectory.
pub type PointHistory = RingBuffer<Point2, HISTORY_LEN>;
