//! Playlist navigation
//!
//! Pure index arithmetic for next/previous under each play mode. Randomness
//! is always passed in, so shuffle order is reproducible with a seeded
//! generator.

use crate::types::PlayMode;
use rand::Rng;

/// Indices drawn by shuffle navigation, oldest first
///
/// A shuffle cycle starts at the index that was current when the history
/// was empty (the anchor). Draws avoid the anchor and every index already
/// drawn, so one cycle visits each other track exactly once. Walking back
/// past the first draw returns to the anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShuffleHistory {
    drawn: Vec<usize>,
    anchor: Option<usize>,
}

impl ShuffleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all draws and start a new cycle
    pub fn clear(&mut self) {
        self.drawn.clear();
        self.anchor = None;
    }

    pub fn contains(&self, index: usize) -> bool {
        self.drawn.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    /// Drawn indices, oldest first
    pub fn as_slice(&self) -> &[usize] {
        &self.drawn
    }

    /// Index the current cycle started from
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    fn is_excluded(&self, index: usize) -> bool {
        self.anchor == Some(index) || self.contains(index)
    }
}

/// Index to move to after `current`
///
/// Returns `None` for an empty playlist, or at the end of the playlist in
/// `Normal` mode.
pub fn next_index<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    mode: PlayMode,
    history: &mut ShuffleHistory,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 || current >= len {
        return None;
    }

    match mode {
        PlayMode::RepeatOne => Some(current),
        PlayMode::Shuffle => Some(shuffle_next(current, len, history, rng)),
        PlayMode::RepeatAll => Some((current + 1) % len),
        PlayMode::Normal => (current + 1 < len).then_some(current + 1),
    }
}

/// Index to move back to from `current`
///
/// In shuffle mode this walks back through the draw history, then to the
/// index the cycle started from, and falls back to a random index once both
/// are used up. Going back past that point does not retrace the original
/// order.
pub fn previous_index<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    mode: PlayMode,
    history: &mut ShuffleHistory,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 || current >= len {
        return None;
    }

    match mode {
        PlayMode::RepeatOne => Some(current),
        PlayMode::Shuffle => {
            while let Some(index) = history.drawn.pop() {
                if index != current && index < len {
                    return Some(index);
                }
            }
            match history.anchor.take() {
                Some(anchor) if anchor != current && anchor < len => Some(anchor),
                _ => Some(random_other(current, len, rng)),
            }
        }
        PlayMode::RepeatAll => Some(if current == 0 { len - 1 } else { current - 1 }),
        PlayMode::Normal => current.checked_sub(1),
    }
}

/// Whether `next_index` would yield an index
pub fn has_next(current: Option<usize>, len: usize, mode: PlayMode) -> bool {
    match current {
        Some(current) if current < len => match mode {
            PlayMode::Normal => current + 1 < len,
            PlayMode::RepeatAll | PlayMode::RepeatOne | PlayMode::Shuffle => true,
        },
        _ => false,
    }
}

/// Whether `previous_index` would yield an index
pub fn has_previous(current: Option<usize>, len: usize, mode: PlayMode) -> bool {
    match current {
        Some(current) if current < len => match mode {
            PlayMode::Normal => current > 0,
            PlayMode::RepeatAll | PlayMode::RepeatOne | PlayMode::Shuffle => true,
        },
        _ => false,
    }
}

fn shuffle_next<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    history: &mut ShuffleHistory,
    rng: &mut R,
) -> usize {
    if len == 1 {
        return current;
    }

    if history.is_empty() {
        history.anchor = Some(current);
    }

    let mut candidates: Vec<usize> = (0..len)
        .filter(|&index| index != current && !history.is_excluded(index))
        .collect();

    if candidates.is_empty() {
        // Every track was drawn once: start a new cycle over the full range
        history.clear();
        history.anchor = Some(current);
        candidates = (0..len).filter(|&index| index != current).collect();
    }

    let pick = candidates[rng.gen_range(0..candidates.len())];
    history.drawn.push(pick);
    pick
}

fn random_other<R: Rng + ?Sized>(current: usize, len: usize, rng: &mut R) -> usize {
    if len == 1 {
        return current;
    }
    // Draw from the len - 1 other indices
    let pick = rng.gen_range(0..len - 1);
    if pick >= current {
        pick + 1
    } else {
        pick
    }
}
