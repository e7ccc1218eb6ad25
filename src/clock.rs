// SPDX-License-Identifier: GPL-3.0-only

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock time, as a duration since the Unix epoch
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        since_epoch(SystemTime::now())
    }
}

/// Times before the epoch read as zero
pub fn since_epoch(time: SystemTime) -> Duration {
    time.duration_since(UNIX_EPOCH).unwrap_or_default()
}
