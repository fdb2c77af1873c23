//! Bounded navigation history

use heapless::Vec;

use super::transition::TransitionKind;
use super::ScreenId;

/// A screen left behind by a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackEntry {
    /// Screen to return to
    pub screen: ScreenId,
    /// Transition that led away from it
    pub left_with: TransitionKind,
}

/// Fixed-depth stack of previous screens
///
/// Pushing past the depth is rejected, never overwrites.
#[derive(Debug, Clone, Default)]
pub struct ScreenStack<const N: usize> {
    entries: Vec<StackEntry, N>,
}

impl<const N: usize> ScreenStack<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Push an entry, handing it back if the stack is full
    pub fn push(&mut self, entry: StackEntry) -> Result<(), StackEntry> {
        self.entries.push(entry)
    }

    /// Pop the most recent entry; `None` at the root
    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub const fn max_depth(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &StackEntry> {
        self.entries.iter()
    }
}
