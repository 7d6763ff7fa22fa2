//! Cancellation tokens for tween runs.

use serde::{Deserialize, Serialize};

/// Generation token carried by one tween run.
///
/// A newer run on the same `(target, property)` pair receives a larger token and the
/// older one stops being live; callbacks compare tokens instead of holding references.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CancelToken(pub u64);

/// Monotonic token allocator, one per `TweenSet`.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_token: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_token(&mut self) -> CancelToken {
        // Token 0 is never handed out so a default token is never live.
        self.next_token = self.next_token.wrapping_add(1);
        CancelToken(self.next_token)
    }
}
