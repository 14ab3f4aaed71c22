//! The periodic control loop.
//!
//! One tick: poll sensors, update the trend window, persist readings,
//! query the outlet, run the decision engine, carry out the decision,
//! persist the switch event, publish the status snapshot. Persistence
//! failures are logged and never stall the loop; keeping the pump decision
//! flowing matters more than a complete history.

use std::time::Duration;

use tokio::sync::watch;

use heatwatch_domain::control::{DecisionAction, DecisionEngine, SwitchReason};
use heatwatch_domain::event::OutletEvent;
use heatwatch_domain::outlet::OutletAction;
use heatwatch_domain::reading::{StoredReading, TemperatureSnapshot};
use heatwatch_domain::status::{OutletStatus, SystemPhase, SystemStatus};
use heatwatch_domain::time::{Timestamp, now};
use heatwatch_domain::trend::{TrendSample, TrendWindow};

use crate::outlet_controller::OutletController;
use crate::ports::{OutletTransport, ReadingStore};
use crate::registry::SensorRegistry;
use crate::status_feed::StatusFeed;

/// Loop cadence and housekeeping intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Pause between ticks.
    pub poll_interval: Duration,
    /// How often the one-line status summary is logged.
    pub log_interval: Duration,
    /// How often the retention sweep runs.
    pub cleanup_interval: Duration,
    /// History older than this is dropped by the sweep.
    pub retention: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            log_interval: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(3600),
            retention: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// Owns everything one tick needs.
pub struct ControlLoop<T, S> {
    registry: SensorRegistry,
    outlet: Option<OutletController<T>>,
    engine: DecisionEngine,
    store: S,
    settings: LoopSettings,
    trend: TrendWindow,
    feed: StatusFeed,
    last_reason: Option<SwitchReason>,
    last_log: Timestamp,
    last_cleanup: Timestamp,
    shutdown: watch::Receiver<bool>,
}

impl<T: OutletTransport, S: ReadingStore> ControlLoop<T, S> {
    /// Assemble a loop. `outlet` is `None` in advisory-only mode: decisions
    /// are evaluated and logged but no actuator commands are issued.
    #[must_use]
    pub fn new(
        registry: SensorRegistry,
        outlet: Option<OutletController<T>>,
        engine: DecisionEngine,
        store: S,
        settings: LoopSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let started = now();
        Self {
            registry,
            outlet,
            engine,
            store,
            settings,
            trend: TrendWindow::new(),
            feed: StatusFeed::new(),
            last_reason: None,
            last_log: started,
            last_cleanup: started,
            shutdown,
        }
    }

    /// Subscribe to the per-tick status snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SystemStatus> {
        self.feed.subscribe()
    }

    /// Run until the shutdown flag is raised.
    pub async fn run(mut self) {
        tracing::info!(
            sensors = self.registry.len(),
            advisory = self.outlet.is_none(),
            "control loop started"
        );
        while !*self.shutdown.borrow() {
            self.tick().await;
            let mut shutdown = self.shutdown.clone();
            tokio::select! {
                () = tokio::time::sleep(self.settings.poll_interval) => {}
                _ = shutdown.wait_for(|stop| *stop) => break,
            }
        }
        tracing::info!("control loop stopped");
    }

    /// One full read-decide-act cycle.
    pub async fn tick(&mut self) {
        let ts = now();
        let snapshot = self.registry.snapshot(ts);
        self.trend.push(TrendSample {
            at: ts,
            boiler: snapshot.boiler(),
            chimney: snapshot.chimney(),
        });

        self.persist_readings(&snapshot).await;

        let reported = match self.outlet.as_mut() {
            Some(controller) => controller.get_status().await,
            None => None,
        };
        let decision = self.engine.decide(&snapshot, &self.trend, reported, ts);

        if !decision.is_noop() {
            self.carry_out(decision.action, decision.reason, ts).await;
        }

        if self.due(self.last_log, self.settings.log_interval, ts) {
            self.log_summary(&snapshot);
            self.last_log = ts;
        }
        if self.due(self.last_cleanup, self.settings.cleanup_interval, ts) {
            self.sweep_history(ts).await;
            self.last_cleanup = ts;
        }

        self.feed.publish(self.build_status(&snapshot, ts));
    }

    async fn persist_readings(&self, snapshot: &TemperatureSnapshot) {
        for entry in snapshot.entries() {
            let Some(temperature) = entry.reading.value else {
                continue;
            };
            let stored = StoredReading {
                sensor_id: entry.reading.sensor_id.clone(),
                temperature,
                timestamp: entry.reading.taken_at,
            };
            if let Err(err) = self.store.append_reading(stored).await {
                tracing::warn!(
                    sensor = %entry.reading.sensor_id,
                    error = %err,
                    "failed to persist reading"
                );
            }
        }
    }

    async fn carry_out(
        &mut self,
        action: DecisionAction,
        reason: Option<SwitchReason>,
        ts: Timestamp,
    ) {
        let outlet_action = match action {
            DecisionAction::TurnOn => OutletAction::On,
            DecisionAction::TurnOff => OutletAction::Off,
            DecisionAction::NoOp => return,
        };
        let Some(reason) = reason else { return };

        let Some(controller) = self.outlet.as_mut() else {
            tracing::info!(action = %outlet_action, %reason, "advisory mode, decision not applied");
            return;
        };

        let applied = controller.set_state(outlet_action.as_bool()).await;
        if applied {
            tracing::info!(action = %outlet_action, %reason, "pump outlet switched");
            self.last_reason = Some(reason);
            let event = OutletEvent::new(outlet_action, reason, ts);
            if let Err(err) = self.store.append_outlet_event(event).await {
                tracing::warn!(error = %err, "failed to persist outlet event");
            }
        } else {
            tracing::warn!(action = %outlet_action, %reason, "pump outlet command failed");
        }
    }

    async fn sweep_history(&self, ts: Timestamp) {
        let Ok(retention) = chrono::Duration::from_std(self.settings.retention) else {
            return;
        };
        match self.store.delete_before(ts - retention).await {
            Ok(deleted) if deleted > 0 => {
                tracing::info!(deleted, "pruned expired history");
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "history sweep failed"),
        }
    }

    fn log_summary(&self, snapshot: &TemperatureSnapshot) {
        let outlet = match self.outlet.as_ref() {
            Some(controller) => {
                let state = controller.state();
                match state.reported_on {
                    Some(true) => format!("on ({})", state.mode),
                    Some(false) => format!("off ({})", state.mode),
                    None => format!("unknown ({})", state.mode),
                }
            }
            None => "advisory".to_owned(),
        };
        tracing::info!(
            boiler = fmt_temp(snapshot.boiler()),
            accumulator = fmt_temp(snapshot.accumulator_max()),
            chimney = fmt_temp(snapshot.chimney()),
            outlet,
            "status"
        );
    }

    fn build_status(&self, snapshot: &TemperatureSnapshot, ts: Timestamp) -> SystemStatus {
        SystemStatus {
            phase: self.phase(snapshot, ts),
            boiler_temp: snapshot.boiler(),
            accumulator_bottom_temp: snapshot.accumulator_bottom(),
            accumulator_top_temp: snapshot.accumulator_top(),
            chimney_temp: snapshot.chimney(),
            sensors: self.registry.statuses(),
            outlet: self.outlet.as_ref().map(|controller| OutletStatus {
                state: controller.state(),
                last_reason: self.last_reason,
            }),
            updated_at: ts,
        }
    }

    fn phase(&self, snapshot: &TemperatureSnapshot, ts: Timestamp) -> SystemPhase {
        let t = self.engine.thresholds();
        if self.trend.is_startup(t.startup_horizon, t.startup_delta, ts) {
            SystemPhase::Startup
        } else if snapshot.chimney().is_some_and(|c| c < t.chimney_low) {
            SystemPhase::CoolingDown
        } else {
            SystemPhase::Running
        }
    }

    #[allow(clippy::unused_self)]
    fn due(&self, last: Timestamp, interval: Duration, ts: Timestamp) -> bool {
        chrono::Duration::from_std(interval).is_ok_and(|interval| ts - last >= interval)
    }
}

fn fmt_temp(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |v| format!("{v:.1}"))
}
