use super::history::{RingBuffer, HISTORY_LEN};

/// Majority vote over the last `HISTORY_LEN` dynamic-gesture ids.
///
/// Ties go to the id whose first occurrence is oldest in the window.
#[derive(Debug, Clone, Default)]
pub struct MajorityVote {
    window: RingBuffer<usize, HISTORY_LEN>,
}

impl MajorityVote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this frame's id and return the current mode.
    pub fn push(&mut self, id: usize) -> usize {
        self.window.push(id);
        self.mode().unwrap_or(id)
    }

    pub fn mode(&self) -> Option<usize> {
        // (id, count) in order of first occurrence
        let mut counts: [(usize, usize); HISTORY_LEN] = [(0, 0); HISTORY_LEN];
        let mut distinct = 0;
        for id in self.window.iter() {
            match counts[..distinct].iter_mut().find(|(k, _)| *k == id) {
                Some(entry) => entry.1 += 1,
                None => {
                    counts[distinct] = (id, 1);
                    distinct += 1;
                }
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for &(id, count) in &counts[..distinct] {
            match best {
                Some((_, c)) if c >= count => {}
                _ => best = Some((id, count)),
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
