use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

/// A fixed-window request limiter for the status endpoint.
///
/// The real accrual service throttles status queries; clients that exceed the budget get a 429
/// with a `Retry-After` hint and are expected to suspend polling until the window rolls over.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<Window>,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    /// `max_requests` of zero disables limiting.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self { max_requests, window, state: Mutex::new(Window { started: Instant::now(), count: 0 }) }
    }

    /// Admits one request, or returns the seconds to wait before the window rolls over.
    pub fn try_acquire(&self) -> Result<(), u64> {
        if self.max_requests == 0 {
            return Ok(());
        }
        let mut window = self.state.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        if window.count < self.max_requests {
            window.count += 1;
            Ok(())
        } else {
            let elapsed = now.duration_since(window.started);
            let remaining = self.window.saturating_sub(elapsed);
            Err(remaining.as_secs().max(1))
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}
