//! Orientation tracking: permission lifecycle, sampling, smoothing, fan-out
//!
//! The manager owns the whole path from "may we use the sensor?" to
//! notified subscribers. It runs strictly on the UI thread; samples are
//! processed synchronously in arrival order and each new sample overwrites
//! the previous one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::angles::{signed_delta, wrap_around};
use crate::consts::{DEFAULT_SMOOTHING_FACTOR, MAX_SMOOTHING_FACTOR, MIN_SMOOTHING_FACTOR};
use crate::platform::Clock;

use super::events::{SubscriberChannel, Subscription};
use super::filter::SmoothingFilter;
use super::permission::{PermissionDecision, PermissionGate};
use super::sample::{OrientationSnapshot, RawOrientationSample};

/// Where the manager is in its permission/tracking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingPhase {
    Uninitialized,
    /// Waiting on the platform's permission prompt
    RequestingPermission,
    /// Subscribed to the sensor and processing samples
    Tracking,
    /// Permission refused or sensor unavailable; retry via `initialize`
    Denied,
    /// Tracking ended; retry via `initialize`
    Stopped,
}

/// Handler an `OrientationSource` invokes for every sensor event
pub type SampleHandler = Rc<dyn Fn(RawOrientationSample)>;

/// Platform event source delivering raw orientation samples
pub trait OrientationSource {
    /// Whether the platform exposes the sensor API at all
    fn is_supported(&self) -> bool;
    /// Begin delivering samples to `handler`, replacing any prior handler
    fn start(&mut self, handler: SampleHandler);
    /// Stop delivering samples. Idempotent.
    fn stop(&mut self);
}

/// Numeric tracking state, mutated only by the manager
#[derive(Debug, Clone, Copy)]
pub struct OrientationState {
    /// The caller-chosen zero heading, degrees in [0, 360)
    pub reference_horizon: f64,
    /// Latest raw heading, wrapped into [0, 360)
    pub current_raw: f64,
    /// EMA-smoothed heading
    pub current_smoothed: f64,
    /// Current heading (mirrors `current_smoothed`)
    pub current_orientation: f64,
    /// Signed offset from the reference horizon, in (-180, 180]
    pub delta_from_reference: f64,
    /// Clock timestamp of the last accepted sample (ms)
    pub last_update: f64,
}

impl Default for OrientationState {
    fn default() -> Self {
        Self {
            reference_horizon: 0.0,
            current_raw: 0.0,
            current_smoothed: 0.0,
            current_orientation: 0.0,
            delta_from_reference: 0.0,
            last_update: 0.0,
        }
    }
}

/// Permission acquisition, continuous sampling, smoothing, and fan-out
pub struct OrientationManager {
    phase: TrackingPhase,
    permission_granted: bool,
    state: OrientationState,
    filter: SmoothingFilter,
    source: Box<dyn OrientationSource>,
    clock: Rc<dyn Clock>,
    orientation_subs: SubscriberChannel<OrientationSnapshot>,
    permission_subs: SubscriberChannel<bool>,
}

impl OrientationManager {
    pub fn new(source: Box<dyn OrientationSource>, clock: Rc<dyn Clock>) -> Self {
        Self {
            phase: TrackingPhase::Uninitialized,
            permission_granted: false,
            state: OrientationState::default(),
            filter: SmoothingFilter::new(DEFAULT_SMOOTHING_FACTOR),
            source,
            clock,
            orientation_subs: SubscriberChannel::new("orientation"),
            permission_subs: SubscriberChannel::new("permission"),
        }
    }

    pub fn phase(&self) -> TrackingPhase {
        self.phase
    }

    pub fn state(&self) -> &OrientationState {
        &self.state
    }

    pub fn is_permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn is_tracking(&self) -> bool {
        self.phase == TrackingPhase::Tracking
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.filter.factor()
    }

    /// Run the permission flow and, when granted, begin tracking
    ///
    /// Returns whether tracking started. Callable again after a denial
    /// (the retry path) or after `destroy`; a call while a request is
    /// already pending or tracking is active changes nothing.
    pub async fn initialize(this: &Rc<RefCell<Self>>, gate: &dyn PermissionGate) -> bool {
        {
            let mut manager = this.borrow_mut();
            match manager.phase {
                TrackingPhase::Tracking => return true,
                TrackingPhase::RequestingPermission => {
                    log::warn!("permission request already pending");
                    return false;
                }
                _ => {}
            }
            if !manager.source.is_supported() {
                log::warn!("orientation sensor API unavailable");
                manager.phase = TrackingPhase::Denied;
                manager.permission_granted = false;
                manager.permission_subs.emit(&false);
                return false;
            }
            manager.phase = TrackingPhase::RequestingPermission;
        }

        let decision = gate.request().await;

        let granted = this.borrow_mut().apply_permission_decision(decision);
        if granted {
            Self::attach_source(this);
        }
        granted
    }

    /// Feed a gate decision into the state machine
    ///
    /// Honored only while a request is actually pending, so a decision
    /// that resolves after `destroy` cannot restart anything.
    pub fn apply_permission_decision(&mut self, decision: PermissionDecision) -> bool {
        if self.phase != TrackingPhase::RequestingPermission {
            log::debug!("dropping permission decision {decision:?} in phase {:?}", self.phase);
            return false;
        }
        let granted = decision.is_granted();
        self.permission_granted = granted;
        if granted {
            self.phase = TrackingPhase::Tracking;
            self.filter.reset();
            log::info!("motion permission granted, tracking");
        } else {
            self.phase = TrackingPhase::Denied;
            log::info!("motion permission unavailable: {decision:?}");
        }
        self.permission_subs.emit(&granted);
        granted
    }

    /// Hook the sensor source up to this manager
    ///
    /// The handler holds only a weak reference, so events that fire after
    /// the manager is dropped fall through harmlessly.
    fn attach_source(this: &Rc<RefCell<Self>>) {
        let weak: Weak<RefCell<Self>> = Rc::downgrade(this);
        let handler: SampleHandler = Rc::new(move |sample| {
            if let Some(manager) = weak.upgrade() {
                manager.borrow_mut().ingest_sample(sample);
            }
        });
        this.borrow_mut().source.start(handler);
    }

    /// Process one raw sensor sample
    ///
    /// Samples without a heading are dropped whole: no state change, no
    /// notification. Accepted samples update the raw and smoothed
    /// headings, recompute the reference delta, and fan out a snapshot.
    pub fn ingest_sample(&mut self, sample: RawOrientationSample) {
        if self.phase != TrackingPhase::Tracking {
            return;
        }
        let Some(alpha) = sample.alpha else {
            return;
        };

        let raw = wrap_around(alpha);
        self.state.current_raw = raw;
        self.state.current_smoothed = self.filter.apply(raw);
        self.state.current_orientation = self.state.current_smoothed;
        self.state.last_update = self.clock.now_ms();
        self.recompute_delta();

        let snapshot = self.snapshot(sample.beta);
        self.orientation_subs.emit(&snapshot);
    }

    /// Set the zero-reference heading; `None` captures the current one
    pub fn set_reference_horizon(&mut self, value: Option<f64>) {
        self.state.reference_horizon = match value {
            Some(horizon) => wrap_around(horizon),
            None => self.state.current_orientation,
        };
        self.recompute_delta();
        log::debug!("reference horizon set to {}", self.state.reference_horizon);
    }

    /// Update the EMA factor; values outside [0.1, 0.3] are rejected and
    /// the prior factor is kept
    pub fn set_smoothing_factor(&mut self, factor: f64) {
        if !(MIN_SMOOTHING_FACTOR..=MAX_SMOOTHING_FACTOR).contains(&factor) {
            log::debug!(
                "smoothing factor {factor} out of range, keeping {}",
                self.filter.factor()
            );
            return;
        }
        self.filter.set_factor(factor);
    }

    pub fn on_orientation_change(
        &mut self,
        callback: impl FnMut(&OrientationSnapshot) + 'static,
    ) -> Subscription {
        self.orientation_subs.subscribe(callback)
    }

    pub fn remove_orientation_subscriber(&mut self, token: Subscription) -> bool {
        self.orientation_subs.unsubscribe(token)
    }

    pub fn on_permission_change(&mut self, callback: impl FnMut(&bool) + 'static) -> Subscription {
        self.permission_subs.subscribe(callback)
    }

    pub fn remove_permission_subscriber(&mut self, token: Subscription) -> bool {
        self.permission_subs.unsubscribe(token)
    }

    /// Stop sample delivery; safe to call when not tracking
    pub fn stop_tracking(&mut self) {
        self.source.stop();
        if self.phase == TrackingPhase::Tracking {
            self.phase = TrackingPhase::Stopped;
            log::info!("orientation tracking stopped");
        }
    }

    /// Detach from the platform and drop every subscriber. Idempotent.
    pub fn destroy(&mut self) {
        self.source.stop();
        self.phase = TrackingPhase::Stopped;
        self.orientation_subs.clear();
        self.permission_subs.clear();
    }

    fn recompute_delta(&mut self) {
        self.state.delta_from_reference =
            signed_delta(self.state.current_orientation, self.state.reference_horizon);
    }

    fn snapshot(&self, tilt: Option<f64>) -> OrientationSnapshot {
        OrientationSnapshot {
            raw: self.state.current_raw,
            smoothed: self.state.current_smoothed,
            current: self.state.current_orientation,
            delta_from_reference: self.state.delta_from_reference,
            reference_horizon: self.state.reference_horizon,
            timestamp: self.state.last_update,
            tilt,
        }
    }
}
