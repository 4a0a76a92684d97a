//! Monotonic read position shared by a container and the session that owns it.

/// Next unread offset within a container's region.
///
/// The cursor only moves forward and every move returns how far it went. The container
/// reports the new position to its session, whose furthest position is what the parent
/// container commits once a nested decode returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Cursor::default()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move forward by `delta` bytes; returns `delta`.
    pub fn advance(&mut self, delta: usize) -> usize {
        self.position += delta;
        delta
    }

    /// Move to `offset` if it lies ahead of the cursor; returns how far the cursor moved.
    pub fn advance_to(&mut self, offset: usize) -> usize {
        let delta = offset.saturating_sub(self.position);
        self.advance(delta)
    }
}
