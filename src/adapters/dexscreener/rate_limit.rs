//! Per-endpoint-class request budgeting.
//!
//! Advisory, non-blocking: a denied acquire means the caller skips that
//! request for this cycle and logs a warning, it never waits. Each class
//! has an independent per-minute ceiling with a 60-second window reset.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Window length for every class.
const WINDOW: Duration = Duration::from_secs(60);

/// Endpoint families with independent ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    TokenProfiles,
    TokenBoosts,
    Search,
    Tokens,
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointClass::TokenProfiles => "token-profiles",
            EndpointClass::TokenBoosts => "token-boosts",
            EndpointClass::Search => "search",
            EndpointClass::Tokens => "tokens",
        };
        f.write_str(name)
    }
}

/// Per-minute ceilings per endpoint class.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub token_profiles: u32,
    pub token_boosts: u32,
    pub search: u32,
    pub tokens: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            token_profiles: 60,
            token_boosts: 60,
            search: 300,
            tokens: 300,
        }
    }
}

impl RateLimits {
    fn limit_for(&self, class: EndpointClass) -> u32 {
        match class {
            EndpointClass::TokenProfiles => self.token_profiles,
            EndpointClass::TokenBoosts => self.token_boosts,
            EndpointClass::Search => self.search,
            EndpointClass::Tokens => self.tokens,
        }
    }
}

#[derive(Debug)]
struct ClassWindow {
    count: u32,
    window_start: Instant,
    limit: u32,
}

/// Counter-per-class limiter with fixed 60-second windows.
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimits,
    windows: HashMap<EndpointClass, ClassWindow>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            windows: HashMap::new(),
        }
    }

    /// Try to reserve one call for `class` right now.
    pub fn try_acquire(&mut self, class: EndpointClass) -> bool {
        self.try_acquire_at(class, Instant::now())
    }

    /// Time-injectable variant for deterministic tests.
    pub fn try_acquire_at(&mut self, class: EndpointClass, now: Instant) -> bool {
        let limit = self.limits.limit_for(class);
        let window = self.windows.entry(class).or_insert(ClassWindow {
            count: 0,
            window_start: now,
            limit,
        });

        if now.duration_since(window.window_start) >= WINDOW {
            window.count = 0;
            window.window_start = now;
        }

        if window.count < window.limit {
            window.count += 1;
            true
        } else {
            false
        }
    }
}
