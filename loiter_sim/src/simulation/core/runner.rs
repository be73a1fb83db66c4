// loiter_sim/src/simulation/core/runner.rs

use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::prelude::*;
use crate::simulation::core::report::ReportBuilder;
use crate::simulation::core::schedule::PeriodicTimer;
use crate::simulation::plugins::perception::{
    publish_truth, render_frame, SharedTruth, SyntheticDetector, SyntheticLocalizer,
};
use crate::simulation::plugins::vehicle::SyntheticVehicle;

/// One complete closed-loop run: vehicle, sensors, scripted operator and the
/// control loop on its dispatch thread.
pub struct Simulation {
    duration: f64,
    dt: f64,
    rng: SimulationRng,
    vehicle: SyntheticVehicle,
    truth: SharedTruth,
    node: ControlNode,
    status: LoopStatus,
    events: VecDeque<ScriptedEvent>,

    // --- Sensor schedules ---
    frame_timer: PeriodicTimer,
    tilt_timer: PeriodicTimer,
    altitude_timer: PeriodicTimer,
    altitude_noise: Normal<f64>,
    altitude_dropout: f64,
    invalid_altitude: f64,

    report: ReportBuilder,
}

impl Simulation {
    /// Builds every component from a validated scenario and starts the
    /// dispatch thread.
    pub fn new(config: &ScenarioConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut rng = SimulationRng::from_seed(config.simulation.seed);
        let vehicle = SyntheticVehicle::new(&config.vehicle);
        let truth: SharedTruth = Arc::new(RwLock::new(*vehicle.truth()));

        let detector = SyntheticDetector::new(&config.perception, rng.fork());
        let localizer = SyntheticLocalizer::new(
            &config.perception,
            config.control.confidence.uninformative_weight,
            Arc::clone(&truth),
            rng.fork(),
        )?;
        let orchestrator =
            FrameOrchestrator::new(&config.control, Box::new(detector), Box::new(localizer))?;
        let node = ControlNode::spawn(orchestrator, config.simulation.channel_capacity)?;

        let mut events: Vec<ScriptedEvent> = config.events.clone();
        events.sort_by(|a, b| a.at.total_cmp(&b.at));

        let altitude_noise = Normal::new(0.0, config.sensors.altitude_stddev)
            .map_err(|e| SimError::InvalidScenario(format!("sensors.altitude_stddev: {}", e)))?;

        info!(
            "Simulation ready: {:.1}s at {:.0} Hz, seed {}, {} scripted events",
            config.simulation.duration,
            config.simulation.physics_rate,
            config.simulation.seed,
            events.len()
        );

        Ok(Self {
            duration: config.simulation.duration,
            dt: 1.0 / config.simulation.physics_rate,
            rng,
            vehicle,
            truth,
            node,
            status: LoopStatus::default(),
            events: events.into(),
            frame_timer: PeriodicTimer::from_rate(config.sensors.frame_rate),
            tilt_timer: PeriodicTimer::from_rate(config.sensors.tilt_rate),
            altitude_timer: PeriodicTimer::from_rate(config.sensors.altitude_rate),
            altitude_noise,
            altitude_dropout: config.sensors.altitude_dropout,
            invalid_altitude: config.control.localization.invalid_altitude,
            report: ReportBuilder::default(),
        })
    }

    /// Runs to completion and shuts the dispatch thread down.
    pub fn run(mut self) -> Result<SimReport, SimError> {
        let steps = (self.duration / self.dt).round() as u64;
        for step in 0..steps {
            let now = step as f64 * self.dt;
            self.tick(now)?;
        }

        let truth = *self.vehicle.truth();
        let report = self.report.finish(self.duration, truth);
        self.node.shutdown()?;
        Ok(report)
    }

    // =========================================================================
    // == Per-Step Logic ==
    // =========================================================================

    fn tick(&mut self, now: f64) -> Result<(), SimError> {
        // --- 1. Operator inputs ---
        while self.events.front().is_some_and(|e| e.at <= now) {
            if let Some(event) = self.events.pop_front() {
                debug!("t={:.3}s operator: {:?}", now, event.action);
                let inbound = match event.action {
                    OperatorAction::Reset => InboundEvent::Reset,
                    OperatorAction::ToggleHold => InboundEvent::ToggleHold,
                    OperatorAction::Mode(command) => InboundEvent::Mode(command),
                };
                self.send(inbound)?;
            }
        }

        // --- 2. Sensors ---
        if self.tilt_timer.tick(now) {
            self.send(InboundEvent::Tilt(self.vehicle.tilt()))?;
        }

        if self.altitude_timer.tick(now) {
            let range = if self.rng.0.gen_bool(self.altitude_dropout) {
                self.invalid_altitude
            } else {
                self.vehicle.truth().position.z + self.altitude_noise.sample(&mut self.rng.0)
            };
            self.send(InboundEvent::Altitude(range))?;
        }

        if self.frame_timer.tick(now) {
            let truth = *self.vehicle.truth();
            publish_truth(&self.truth, truth);

            let before = self.status;
            self.send(InboundEvent::Frame(render_frame(now)))?;
            self.report.record_frame(&before, &self.status, &truth);
        }

        // --- 3. Physics ---
        self.vehicle.step(self.dt, &mut self.rng.0);
        Ok(())
    }

    /// Delivers one event and applies its outbound batch to the world.
    fn send(&mut self, event: InboundEvent) -> Result<(), SimError> {
        let NodeReply { outbound, status } = self.node.request(event)?;
        for message in &outbound {
            if let OutboundMessage::Command(command) = message {
                self.vehicle.apply(command);
            }
        }
        self.report.record_outbound(&outbound);
        self.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(extra: &str) -> ScenarioConfig {
        let base = r#"
            [simulation]
            seed = 11
            duration = 20.0

            [vehicle]
            wind = [0.05, -0.03]
            jitter_stddev = 0.01

            [[events]]
            at = 0.5
            action = "Reset"

            [[events]]
            at = 2.0
            action = "ToggleHold"
        "#;
        toml::from_str(&format!("{}\n{}", base, extra)).unwrap()
    }

    #[test]
    fn test_hold_keeps_vehicle_near_target_in_wind() {
        let report = Simulation::new(&scenario("")).unwrap().run().unwrap();

        // 20 Hz camera for 20 s.
        assert_eq!(report.frames, 400);
        assert_eq!(report.transforms, 400);
        assert_eq!(report.snapshots, 1);
        assert_eq!(report.restarts, 0);
        assert!(report.hold_samples > 300);
        assert!(report.hold_rms_error < 0.15, "rms {}", report.hold_rms_error);
        assert!(report.hold_max_error < 0.3, "max {}", report.hold_max_error);
    }

    #[test]
    fn test_without_hold_the_wind_wins() {
        let mut config = scenario("");
        config.events.retain(|e| e.action != OperatorAction::ToggleHold);
        let report = Simulation::new(&config).unwrap().run().unwrap();

        assert_eq!(report.commands, 0);
        assert_eq!(report.hold_samples, 0);
        // 0.05 m/s for 20 s.
        assert!(report.final_truth.position.x > 0.7);
    }

    #[test]
    fn test_sustained_degeneracy_restarts_localization_once() {
        let config = scenario(
            r#"
            [perception]
            degenerate = [[6.0, 18.0]]
            "#,
        );
        let report = Simulation::new(&config).unwrap().run().unwrap();
        assert_eq!(report.restarts, 1);
    }

    #[test]
    fn test_same_seed_same_report() {
        let config = scenario(
            r#"
            [sensors]
            altitude_dropout = 0.2

            [perception]
            dropout_probability = 0.1
            "#,
        );
        let a = Simulation::new(&config).unwrap().run().unwrap();
        let b = Simulation::new(&config).unwrap().run().unwrap();
        assert_eq!(a, b);
    }
}
