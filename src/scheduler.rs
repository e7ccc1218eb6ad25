// SPDX-License-Identifier: GPL-3.0-only

//! Drives a [`Totp`] once per second and publishes what it produces.
//!
//! The scheduler is either idle (no ticker task) or active (one ticker task
//! for the current secret). Every publication is tagged with the session
//! generation it belongs to and is dropped under the channel lock if a newer
//! session has begun, so a replaced session can never publish after its
//! successor.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::otp::secret::SecretInput;
use crate::otp::totp::{Tick, Totp};

/// What the presentation layer should currently show
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Update {
    /// No secret entered
    #[default]
    Idle,
    Tick(Tick),
    /// A secret was entered but no code can be generated from it
    InvalidSecret,
}

struct Publisher {
    tx: watch::Sender<Update>,
    generation: AtomicU64,
}

impl Publisher {
    /// Starts a new session, invalidating every earlier generation
    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns false if `generation` has been superseded
    fn publish(&self, generation: u64, update: Update) -> bool {
        self.tx.send_if_modified(|slot| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            *slot = update;
            true
        })
    }
}

pub struct Scheduler {
    clock: Arc<dyn Clock>,
    publisher: Arc<Publisher>,
    ticker: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(clock: impl Clock) -> Self {
        let (tx, _) = watch::channel(Update::Idle);
        Self {
            clock: Arc::new(clock),
            publisher: Arc::new(Publisher {
                tx,
                generation: AtomicU64::new(0),
            }),
            ticker: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Update> {
        self.publisher.tx.subscribe()
    }

    /// The most recently published code, if any
    pub fn current_code(&self) -> Option<String> {
        match &*self.publisher.tx.borrow() {
            Update::Tick(tick) => Some(tick.code.clone()),
            Update::Idle | Update::InvalidSecret => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|ticker| !ticker.is_finished())
    }

    /// Handles one edit of the secret text.
    ///
    /// A blank value stops the scheduler. Anything else replaces the current
    /// session: the previous ticker is cancelled and the first code for the
    /// new secret is published before this returns. Outside of a Tokio
    /// runtime only that first code is published.
    pub fn set_secret(&mut self, raw: &str) {
        let input = SecretInput::parse(raw);
        if input.is_empty() {
            self.stop();
            return;
        }

        self.cancel_ticker();
        let generation = self.publisher.begin();

        match Totp::new(&input) {
            Ok(totp) => {
                tracing::debug!(generation, key_len = totp.key_len(), "session started");

                let entered = self.clock.now().as_secs();
                self.publisher.publish(generation, Update::Tick(totp.tick_at(entered)));

                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        self.ticker = Some(handle.spawn(run(
                            totp,
                            Arc::clone(&self.clock),
                            Arc::clone(&self.publisher),
                            generation,
                            entered,
                        )));
                    }
                    Err(err) => tracing::warn!("Not ticking without a runtime: {}", err),
                }
            }
            Err(err) => {
                tracing::debug!(generation, "{}", err);
                self.publisher.publish(generation, Update::InvalidSecret);
            }
        }
    }

    /// Cancels the ticker and publishes [`Update::Idle`]
    pub fn stop(&mut self) {
        self.cancel_ticker();
        let generation = self.publisher.begin();
        self.publisher.publish(generation, Update::Idle);
        tracing::debug!(generation, "session stopped");
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

/// Publishes a tick at every whole second after `last` until superseded or
/// aborted. Each tick reports a later second than the one before it, a wall
/// clock that lags or steps back holds the ticker until it passes `last`.
async fn run(
    totp: Totp,
    clock: Arc<dyn Clock>,
    publisher: Arc<Publisher>,
    generation: u64,
    mut last: u64,
) {
    loop {
        let now = clock.now();
        let target = now.as_secs().max(last) + 1;

        tokio::time::sleep(Duration::from_secs(target).saturating_sub(now)).await;

        last = clock.now().as_secs().max(target);
        let tick = totp.tick_at(last);
        tracing::trace!(
            generation,
            seconds_remaining = tick.seconds_remaining,
            "tick"
        );

        if !publisher.publish(generation, Update::Tick(tick)) {
            break;
        }
    }
}
