// loiter_core/src/orchestrator.rs

//! The per-frame state machine that wires localization, fusion, confidence
//! tracking, position hold and operator commands together.
//!
//! `FrameOrchestrator` owns all mutable loop state and has no internal
//! synchronization. The host must feed it one `InboundEvent` at a time.

use crate::config::ControlConfig;
use crate::control::{Dispatch, HoldController, HoldStep, ModeDispatcher};
use crate::error::ConfigError;
use crate::estimation::{ConfidenceState, ConfidenceTracker, PoseFusion};
use crate::localization::{
    AdapterOutput, FeatureDetector, ParticleLocalizer, PoseEstimatorAdapter,
};
use crate::messages::{
    FlightCommand, InboundEvent, ModeCommand, OutboundMessage, PoseTransform, BASE_FRAME,
    WORLD_FRAME,
};
use crate::types::{CameraFrame, FusedPose, HoldTarget, Tilt};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct FrameOrchestrator {
    adapter: PoseEstimatorAdapter,
    fusion: PoseFusion,
    confidence: ConfidenceTracker,
    hold: HoldController,
    dispatcher: ModeDispatcher,

    /// The believed pose. Only localization updates write to it.
    pose: FusedPose,
    /// Latest valid range-finder altitude.
    altitude: f64,
    tilt: Option<Tilt>,
    /// Whether localization has been started by a reset event.
    localizing: bool,
    /// Timestamp of the previous camera frame, localizing or not.
    prev_frame_time: Option<f64>,
    /// The outgoing hold command, kept between frames.
    command: FlightCommand,

    invalid_altitude: f64,
    max_tilt_age: Option<f64>,
}

impl FrameOrchestrator {
    /// Builds the loop from a validated configuration and the two external
    /// collaborators.
    pub fn new(
        config: &ControlConfig,
        detector: Box<dyn FeatureDetector>,
        localizer: Box<dyn ParticleLocalizer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            adapter: PoseEstimatorAdapter::new(
                detector,
                localizer,
                config.localization.particle_count,
            ),
            fusion: PoseFusion::new(&config.fusion),
            confidence: ConfidenceTracker::new(&config.confidence),
            hold: HoldController::new(config),
            dispatcher: ModeDispatcher::new(&config.scaling),
            pose: FusedPose::default(),
            altitude: config.localization.initial_altitude,
            tilt: None,
            localizing: false,
            prev_frame_time: None,
            command: FlightCommand::default(),
            invalid_altitude: config.localization.invalid_altitude,
            max_tilt_age: config.localization.max_tilt_age,
        })
    }

    /// Single entry point for every inbound event.
    pub fn handle(&mut self, event: &InboundEvent) -> Vec<OutboundMessage> {
        match event {
            InboundEvent::Frame(frame) => self.on_frame(frame),
            InboundEvent::Altitude(range) => {
                self.on_altitude(*range);
                Vec::new()
            }
            InboundEvent::Tilt(tilt) => {
                self.on_tilt(*tilt);
                Vec::new()
            }
            InboundEvent::Mode(command) => self.on_mode(command),
            InboundEvent::Reset => {
                self.on_reset();
                Vec::new()
            }
            InboundEvent::ToggleHold => {
                self.on_toggle_hold();
                Vec::new()
            }
        }
    }

    // =========================================================================
    // == Per-Frame Cycle ==
    // =========================================================================

    /// Runs one camera-frame cycle: localize, fuse, check confidence, hold,
    /// and always finish by republishing the pose transform.
    pub fn on_frame(&mut self, frame: &CameraFrame) -> Vec<OutboundMessage> {
        let now = frame.timestamp;
        let mut outbound = Vec::new();

        if self.localizing {
            let tilt = self.tilt_for(now);
            match self.adapter.estimate(frame, self.altitude, &tilt) {
                None => {}
                Some(AdapterOutput::Initialized(estimate)) => {
                    self.pose = self.fusion.adopt(&estimate, self.altitude);
                    info!(
                        "Localization initialized at ({:.3}, {:.3}, {:.3} rad)",
                        self.pose.x, self.pose.y, self.pose.yaw
                    );
                }
                Some(AdapterOutput::Updated(estimate)) => {
                    self.pose = self.fusion.fuse(&self.pose, &estimate, self.altitude);
                    debug!(
                        "pose ({:.3}, {:.3}, {:.3} rad) weight {:.4}",
                        self.pose.x, self.pose.y, self.pose.yaw, estimate.weight
                    );

                    match self.confidence.update(estimate.weight) {
                        ConfidenceState::Lost => {
                            self.restart_localization();
                            outbound.push(OutboundMessage::Command(self.command));
                        }
                        ConfidenceState::Tracking | ConfidenceState::Degraded => {
                            if self.hold.is_engaged() {
                                let dt = self.prev_frame_time.map_or(0.0, |prev| now - prev);
                                self.run_hold(frame, dt, &mut outbound);
                            }
                        }
                    }
                    debug!("confidence counter {}", self.confidence.counter());
                }
            }
        }

        self.prev_frame_time = Some(now);
        outbound.push(OutboundMessage::Transform(self.pose_transform(now)));
        outbound
    }

    fn run_hold(&mut self, frame: &CameraFrame, dt: f64, outbound: &mut Vec<OutboundMessage>) {
        match self.hold.step(&self.pose, dt) {
            HoldStep::Latched(target) => {
                info!(
                    "Hold target latched at ({:.3}, {:.3})",
                    target.x, target.y
                );
                outbound.push(OutboundMessage::Snapshot(frame.clone()));
            }
            HoldStep::Command {
                x_velocity,
                y_velocity,
                yaw_velocity,
            } => {
                self.command.x_velocity = x_velocity;
                self.command.y_velocity = y_velocity;
                self.command.yaw_velocity = yaw_velocity;
                outbound.push(OutboundMessage::Command(self.command));
            }
        }
    }

    /// Sustained degeneracy: start over from a fresh particle population and
    /// bring the vehicle to a stop. The tracker has already zeroed itself.
    fn restart_localization(&mut self) {
        info!("Restart localization");
        self.adapter.rearm();
        self.hold.reset_integrals();
        self.command.halt();
    }

    /// The tilt sample to hand to the localizer for a frame at `now`.
    fn tilt_for(&self, now: f64) -> Tilt {
        match (self.tilt, self.max_tilt_age) {
            (Some(tilt), None) => tilt,
            (Some(tilt), Some(max_age)) if now - tilt.timestamp <= max_age => tilt,
            (Some(tilt), Some(_)) => {
                debug!(
                    "Tilt sample is {:.3}s old; assuming level.",
                    now - tilt.timestamp
                );
                Tilt::level()
            }
            (None, _) => Tilt::level(),
        }
    }

    fn pose_transform(&self, timestamp: f64) -> PoseTransform {
        PoseTransform {
            parent_frame: WORLD_FRAME,
            child_frame: BASE_FRAME,
            pose: self.pose.to_isometry(self.altitude),
            timestamp,
        }
    }

    // =========================================================================
    // == Asynchronous Inputs ==
    // =========================================================================

    pub fn on_altitude(&mut self, range: f64) {
        // The range finder reports the sentinel value exactly when it has no return.
        if range != self.invalid_altitude {
            self.altitude = range;
        }
    }

    pub fn on_tilt(&mut self, tilt: Tilt) {
        self.tilt = Some(tilt);
    }

    pub fn on_mode(&mut self, command: &ModeCommand) -> Vec<OutboundMessage> {
        match self.dispatcher.dispatch(command, &mut self.hold) {
            Dispatch::Forward(out) => {
                debug!("Forwarding velocity command {:?}", out);
                vec![OutboundMessage::Command(out)]
            }
            Dispatch::Nudged(target) => {
                info!("Target position ({:.3}, {:.3})", target.x, target.y);
                Vec::new()
            }
            Dispatch::Dropped => {
                debug!("Hold target not latched yet; dropping nudge.");
                Vec::new()
            }
        }
    }

    /// Starts (or restarts) localization from scratch and leaves hold.
    pub fn on_reset(&mut self) {
        info!("Start localization");
        self.localizing = true;
        self.adapter.rearm();
        self.confidence.reset();
        self.hold.disengage();
    }

    pub fn on_toggle_hold(&mut self) {
        let engaged = self.hold.toggle();
        info!(
            "Position hold {}",
            if engaged { "enabled." } else { "disabled." }
        );
    }

    // =========================================================================
    // == Accessors ==
    // =========================================================================

    pub fn pose(&self) -> &FusedPose {
        &self.pose
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn is_localizing(&self) -> bool {
        self.localizing
    }

    pub fn is_initializing(&self) -> bool {
        self.adapter.is_initializing()
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_engaged()
    }

    pub fn hold_target(&self) -> Option<&HoldTarget> {
        self.hold.target()
    }

    pub fn confidence_counter(&self) -> i32 {
        self.confidence.counter()
    }

    /// Integral accumulators as `(x, y, yaw)`.
    pub fn integrals(&self) -> (f64, f64, f64) {
        self.hold.integrals()
    }
}
