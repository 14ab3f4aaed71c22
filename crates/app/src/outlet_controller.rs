//! Outlet controller — actuator state machine over one transport.
//!
//! The controller owns the retry budget and the offline fallback modes.
//! In `Live` mode a failed request is retried with a fixed delay; once the
//! budget is exhausted the controller drops to `SimulatedOffline` (when
//! simulation is permitted) or `Unavailable` (when it is not). In either
//! offline mode every command makes one non-retried recovery attempt
//! against the real device before falling back to the offline behaviour.

use std::time::Duration;

use tokio::sync::watch;

use heatwatch_domain::outlet::{OutletMode, OutletState};
use heatwatch_domain::time::{Timestamp, now};

use crate::ports::{OutletReply, OutletRequest, OutletTransport, TransportError};

/// Retry budget for live requests.
///
/// Values outside the supported ranges are clamped on construction, so a
/// misconfigured daemon degrades to the nearest sane behaviour instead of
/// hammering the device or stalling the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    const MIN_ATTEMPTS: u32 = 1;
    const MAX_ATTEMPTS: u32 = 10;
    const MIN_DELAY: Duration = Duration::from_millis(500);
    const MAX_DELAY: Duration = Duration::from_secs(10);

    /// Build a policy, clamping `attempts` to `1..=10` and `delay` to
    /// `0.5s..=10s`.
    #[must_use]
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.clamp(Self::MIN_ATTEMPTS, Self::MAX_ATTEMPTS),
            delay: delay.clamp(Self::MIN_DELAY, Self::MAX_DELAY),
        }
    }

    /// Total attempts per command, including the first.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Outcome of a retried request.
enum Attempt {
    /// The device answered.
    Reply(OutletReply),
    /// The device refused; no mode transition.
    Rejected(String),
    /// Retry budget exhausted on transient failures.
    Exhausted,
    /// Shutdown requested mid-retry; no mode transition.
    Cancelled,
}

/// State machine driving one smart plug.
pub struct OutletController<T> {
    transport: Option<T>,
    policy: RetryPolicy,
    allow_simulation: bool,
    mode: OutletMode,
    /// Last relay state confirmed by (or commanded to) the real device.
    last_confirmed: Option<bool>,
    /// Relay state tracked while in `SimulatedOffline`.
    simulated_on: bool,
    connection_ok: bool,
    last_update: Option<Timestamp>,
    shutdown: watch::Receiver<bool>,
}

impl<T: OutletTransport> OutletController<T> {
    /// Create a controller.
    ///
    /// With no transport the controller starts directly in its offline
    /// mode: `SimulatedOffline` when simulation is permitted, `Unavailable`
    /// otherwise.
    #[must_use]
    pub fn new(
        transport: Option<T>,
        policy: RetryPolicy,
        allow_simulation: bool,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let mode = if transport.is_some() {
            OutletMode::Live
        } else if allow_simulation {
            OutletMode::SimulatedOffline
        } else {
            OutletMode::Unavailable
        };
        Self {
            transport,
            policy,
            allow_simulation,
            mode,
            last_confirmed: None,
            simulated_on: false,
            connection_ok: false,
            last_update: None,
            shutdown,
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> OutletMode {
        self.mode
    }

    /// Current state for the status surface.
    #[must_use]
    pub fn state(&self) -> OutletState {
        OutletState::new(
            self.mode,
            self.reported(),
            self.connection_ok,
            self.last_update,
        )
    }

    fn reported(&self) -> Option<bool> {
        match self.mode {
            OutletMode::Live => self.last_confirmed,
            OutletMode::SimulatedOffline => Some(self.simulated_on),
            OutletMode::Unavailable => None,
        }
    }

    /// Switch the relay on. Returns whether the command took effect
    /// (simulated effect included).
    pub async fn turn_on(&mut self) -> bool {
        self.set_state(true).await
    }

    /// Switch the relay off.
    pub async fn turn_off(&mut self) -> bool {
        self.set_state(false).await
    }

    /// Flip the relay relative to the current belief about its state. An
    /// unknown relay is treated as off, so the first toggle switches on.
    pub async fn toggle(&mut self) -> bool {
        let target = !self.reported().unwrap_or(false);
        self.set_state(target).await
    }

    /// Drive the relay to `on`.
    pub async fn set_state(&mut self, on: bool) -> bool {
        let request = if on {
            OutletRequest::PowerOn
        } else {
            OutletRequest::PowerOff
        };
        match self.mode {
            OutletMode::Live => self.command_live(request, on).await,
            OutletMode::SimulatedOffline | OutletMode::Unavailable => {
                self.command_offline(request, on).await
            }
        }
    }

    /// Query the relay state.
    ///
    /// Returns the device's answer in `Live` mode, the tracked state in
    /// `SimulatedOffline`, and `None` in `Unavailable`. An ambiguous reply
    /// falls back to the last confirmed value rather than guessing.
    pub async fn get_status(&mut self) -> Option<bool> {
        match self.mode {
            OutletMode::Live => match self.attempt_with_retries(OutletRequest::PowerQuery).await {
                Attempt::Reply(reply) => {
                    self.connection_ok = true;
                    match reply.power_on {
                        Some(on) => {
                            self.last_confirmed = Some(on);
                            self.last_update = Some(now());
                            Some(on)
                        }
                        None => {
                            tracing::warn!("outlet status reply was ambiguous");
                            self.last_confirmed
                        }
                    }
                }
                Attempt::Rejected(reason) => {
                    tracing::warn!(%reason, "outlet refused status query");
                    self.last_confirmed
                }
                Attempt::Exhausted => {
                    self.go_offline();
                    self.reported()
                }
                Attempt::Cancelled => self.last_confirmed,
            },
            OutletMode::SimulatedOffline | OutletMode::Unavailable => {
                if let Some(reply) = self.try_recover(OutletRequest::PowerQuery).await {
                    match reply.power_on {
                        Some(on) => {
                            self.last_confirmed = Some(on);
                            self.last_update = Some(now());
                            Some(on)
                        }
                        None => self.last_confirmed,
                    }
                } else {
                    self.reported()
                }
            }
        }
    }

    /// Command path while the controller believes the device is reachable.
    async fn command_live(&mut self, request: OutletRequest, on: bool) -> bool {
        match self.attempt_with_retries(request).await {
            Attempt::Reply(reply) => {
                self.connection_ok = true;
                if reply.power_on != Some(on) {
                    // The device accepted the request but the reply did not
                    // confirm the target state. Treat as success, flag it.
                    tracing::warn!(
                        target = on,
                        reported = ?reply.power_on,
                        "outlet reply did not confirm the commanded state"
                    );
                }
                self.last_confirmed = Some(on);
                self.last_update = Some(now());
                true
            }
            Attempt::Rejected(reason) => {
                tracing::warn!(%reason, target = on, "outlet rejected the command");
                self.last_update = Some(now());
                false
            }
            Attempt::Exhausted => {
                self.go_offline();
                self.last_update = Some(now());
                if self.mode == OutletMode::SimulatedOffline {
                    self.simulated_on = on;
                    true
                } else {
                    false
                }
            }
            Attempt::Cancelled => false,
        }
    }

    /// Command path in either offline mode: one recovery attempt, then the
    /// offline behaviour.
    async fn command_offline(&mut self, request: OutletRequest, on: bool) -> bool {
        if let Some(reply) = self.try_recover(request).await {
            if reply.power_on != Some(on) {
                tracing::warn!(
                    target = on,
                    reported = ?reply.power_on,
                    "outlet reply did not confirm the commanded state"
                );
            }
            self.last_confirmed = Some(on);
            self.last_update = Some(now());
            return true;
        }
        match self.mode {
            OutletMode::SimulatedOffline => {
                self.simulated_on = on;
                self.last_update = Some(now());
                tracing::debug!(target = on, "outlet switched in simulation");
                true
            }
            // Recovery may have flipped us back to Live with a rejection.
            OutletMode::Live | OutletMode::Unavailable => {
                self.last_update = Some(now());
                false
            }
        }
    }

    /// One non-retried attempt against the real device while offline.
    ///
    /// A successful reply (or a definitive rejection, which proves the
    /// device is reachable) returns the controller to `Live`.
    async fn try_recover(&mut self, request: OutletRequest) -> Option<OutletReply> {
        let transport = self.transport.as_ref()?;
        match transport.execute(request).await {
            Ok(reply) => {
                tracing::info!(endpoint = transport.endpoint(), "outlet connection recovered");
                self.mode = OutletMode::Live;
                self.connection_ok = true;
                Some(reply)
            }
            Err(err) if err.is_definitive() => {
                tracing::warn!(error = %err, "outlet reachable again but refused the request");
                self.mode = OutletMode::Live;
                self.connection_ok = true;
                None
            }
            Err(_) => None,
        }
    }

    fn go_offline(&mut self) {
        self.connection_ok = false;
        if self.allow_simulation {
            if self.mode != OutletMode::SimulatedOffline {
                tracing::warn!("outlet unreachable, continuing in simulated mode");
            }
            // Seed the simulated relay from the last known real state.
            self.simulated_on = self.last_confirmed.unwrap_or(self.simulated_on);
            self.mode = OutletMode::SimulatedOffline;
        } else {
            if self.mode != OutletMode::Unavailable {
                tracing::error!("outlet unreachable and simulation is not permitted");
            }
            self.mode = OutletMode::Unavailable;
        }
    }

    /// Run one request with the configured retry budget. Transient errors
    /// are retried after a fixed delay; a rejection short-circuits.
    async fn attempt_with_retries(&self, request: OutletRequest) -> Attempt {
        let Some(transport) = self.transport.as_ref() else {
            return Attempt::Exhausted;
        };
        for attempt in 1..=self.policy.attempts() {
            match transport.execute(request).await {
                Ok(reply) => return Attempt::Reply(reply),
                Err(err) if err.is_definitive() => return Attempt::Rejected(err.to_string()),
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        of = self.policy.attempts(),
                        endpoint = transport.endpoint(),
                        error = %err,
                        "outlet request failed"
                    );
                    if attempt < self.policy.attempts() {
                        let mut shutdown = self.shutdown.clone();
                        tokio::select! {
                            () = tokio::time::sleep(self.policy.delay()) => {}
                            _ = shutdown.wait_for(|stop| *stop) => return Attempt::Cancelled,
                        }
                    }
                }
            }
        }
        Attempt::Exhausted
    }
}
