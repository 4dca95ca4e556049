use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one accepted load. Only the newest token may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

/// Hands out request tokens and answers whether a token is still the newest.
///
/// A load captures its token before awaiting the fetcher and checks
/// [`RequestArbiter::is_current`] again before touching list state, so results
/// land in acceptance order rather than completion order.
#[derive(Debug, Default)]
pub struct RequestArbiter {
    counter: AtomicU64,
}

impl RequestArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_request(&self) -> RequestToken {
        RequestToken(self.counter.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.counter.load(Ordering::Acquire) == token.0
    }

    pub fn current(&self) -> RequestToken {
        RequestToken(self.counter.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_monotonically() {
        let arbiter = RequestArbiter::new();
        let first = arbiter.begin_request();
        let second = arbiter.begin_request();
        assert!(second > first);
        assert_eq!(arbiter.current(), second);
    }

    #[test]
    fn only_newest_token_is_current() {
        let arbiter = RequestArbiter::new();
        let first = arbiter.begin_request();
        assert!(arbiter.is_current(first));

        let second = arbiter.begin_request();
        assert!(!arbiter.is_current(first));
        assert!(arbiter.is_current(second));
    }

    #[test]
    fn fresh_arbiter_starts_at_zero() {
        assert_eq!(RequestArbiter::new().current(), RequestToken(0));
    }
}
