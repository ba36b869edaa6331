//! Generation counter for invalidating stale deferred results
//!
//! Camera flights and places searches complete after the state that started
//! them may have been reset. Every deferred operation captures an
//! [`EpochToken`] at creation time; a full reset bumps the counter, and
//! completions whose token is no longer current are dropped on arrival.
//! The UI loop owns the counter; tokens are plain `Copy` data that may
//! travel through channels.

/// Monotonically increasing generation counter.
#[derive(Debug, Default)]
pub struct Epoch(u64);

/// A snapshot of the counter, attached to a deferred operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochToken(u64);

impl Epoch {
    /// Token for the current generation.
    #[inline]
    pub fn current(&self) -> EpochToken {
        EpochToken(self.0)
    }

    /// Invalidate every outstanding token.
    #[inline]
    pub fn bump(&mut self) {
        self.0 += 1;
        tracing::trace!(generation = self.0, "epoch bumped");
    }

    /// Whether a token was issued in the current generation.
    #[inline]
    pub fn is_current(&self, token: EpochToken) -> bool {
        token.0 == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_valid_until_bump() {
        let mut epoch = Epoch::default();
        let token = epoch.current();
        assert!(epoch.is_current(token));

        epoch.bump();
        assert!(!epoch.is_current(token));
        assert!(epoch.is_current(epoch.current()));
    }

    #[test]
    fn test_bump_invalidates_all_outstanding_tokens() {
        let mut epoch = Epoch::default();
        let a = epoch.current();
        let b = epoch.current();
        epoch.bump();
        epoch.bump();
        assert!(!epoch.is_current(a));
        assert!(!epoch.is_current(b));
    }
}
