// loiter_sim/src/simulation/core/report.rs

use loiter_core::messages::OutboundMessage;
use nalgebra::Vector2;
use tracing::info;

use crate::simulation::core::node::LoopStatus;
use crate::simulation::plugins::vehicle::GroundTruth;

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimReport {
    pub duration: f64,
    pub frames: usize,
    pub commands: usize,
    pub snapshots: usize,
    pub transforms: usize,
    /// Localization restarts triggered by the confidence tracker. Operator
    /// resets are not counted.
    pub restarts: usize,
    /// Horizontal distance between the true position and the hold target,
    /// sampled on every frame with a latched target.
    pub hold_samples: usize,
    pub hold_rms_error: f64,
    pub hold_max_error: f64,
    pub final_truth: GroundTruth,
    /// Last broadcast `(x, y, yaw)` estimate.
    pub final_estimate: Option<(f64, f64, f64)>,
}

impl SimReport {
    pub fn log(&self) {
        info!("--- Simulation Report ({:.1}s) ---", self.duration);
        info!(
            "  frames: {}, commands: {}, snapshots: {}, transforms: {}",
            self.frames, self.commands, self.snapshots, self.transforms
        );
        info!("  localization restarts: {}", self.restarts);
        if self.hold_samples > 0 {
            info!(
                "  hold error over {} frames: rms {:.3} m, max {:.3} m",
                self.hold_samples, self.hold_rms_error, self.hold_max_error
            );
        } else {
            info!("  position hold never latched a target");
        }
        let truth = &self.final_truth;
        info!(
            "  final truth: ({:.3}, {:.3}, {:.3} rad)",
            truth.position.x, truth.position.y, truth.yaw
        );
        if let Some((x, y, yaw)) = self.final_estimate {
            info!("  final estimate: ({:.3}, {:.3}, {:.3} rad)", x, y, yaw);
        }
    }
}

/// Accumulates statistics while the simulation runs.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    report: SimReport,
    squared_error_sum: f64,
}

impl ReportBuilder {
    /// Tallies one outbound batch.
    pub fn record_outbound(&mut self, outbound: &[OutboundMessage]) {
        for message in outbound {
            match message {
                OutboundMessage::Command(_) => self.report.commands += 1,
                OutboundMessage::Snapshot(_) => self.report.snapshots += 1,
                OutboundMessage::Transform(tf) => {
                    self.report.transforms += 1;
                    let (_, _, yaw) = tf.pose.rotation.euler_angles();
                    self.report.final_estimate =
                        Some((tf.pose.translation.x, tf.pose.translation.y, yaw));
                }
            }
        }
    }

    /// Records the loop state after a camera frame.
    ///
    /// A frame that re-arms an already seeded adapter means the confidence
    /// tracker gave up on localization. Operator resets happen between frames
    /// and never show up here.
    pub fn record_frame(&mut self, before: &LoopStatus, after: &LoopStatus, truth: &GroundTruth) {
        self.report.frames += 1;

        if before.localizing && !before.initializing && after.initializing {
            self.report.restarts += 1;
        }

        if let (true, Some(target)) = (after.holding, after.hold_target) {
            let error = (Vector2::new(target.x, target.y) - truth.position.xy()).norm();
            self.report.hold_samples += 1;
            self.squared_error_sum += error * error;
            self.report.hold_max_error = self.report.hold_max_error.max(error);
        }
    }

    pub fn finish(mut self, duration: f64, truth: GroundTruth) -> SimReport {
        if self.report.hold_samples > 0 {
            self.report.hold_rms_error =
                (self.squared_error_sum / self.report.hold_samples as f64).sqrt();
        }
        self.report.duration = duration;
        self.report.final_truth = truth;
        self.report
    }
}
