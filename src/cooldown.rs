use std::collections::HashMap;
use std::time::{Duration, Instant};

use serenity::model::id::UserId;
use serenity::prelude::TypeMapKey;

pub const REVIEW_COOLDOWN: Duration = Duration::from_secs(120);
pub const REVISE_COOLDOWN: Duration = Duration::from_secs(30);

/// Per-user fixed-window rate limit for one command.
///
/// A use is consumed on every invocation attempt that passes the gate, even
/// if the command later fails validation. A violation does not reset the
/// window. Hitting the gate is expected control flow, not an error, so the
/// violation branch carries the remaining wait instead of a `BotError`.
pub struct CooldownBucket {
    window: Duration,
    last_use: HashMap<UserId, Instant>,
}

impl CooldownBucket {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_use: HashMap::new(),
        }
    }

    /// Record a use at `now`, or report the remaining wait in seconds.
    pub fn try_use(&mut self, user: UserId, now: Instant) -> Result<(), f64> {
        if let Some(&last) = self.last_use.get(&user) {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.window {
                return Err((self.window - elapsed).as_secs_f64());
            }
        }
        self.last_use.insert(user, now);
        Ok(())
    }
}

/// Both command buckets, stored in serenity's TypeMap behind the client data
/// lock.
pub struct Cooldowns {
    pub review: CooldownBucket,
    pub revise: CooldownBucket,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self {
            review: CooldownBucket::new(REVIEW_COOLDOWN),
            revise: CooldownBucket::new(REVISE_COOLDOWN),
        }
    }
}

impl TypeMapKey for Cooldowns {
    type Value = Cooldowns;
}

pub fn cooldown_notice(mention: &str, retry_after: f64) -> String {
    format!(
        "⌛ {} {:.2} seconds left before you can use this command again.",
        mention, retry_after
    )
}
