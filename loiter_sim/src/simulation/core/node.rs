// loiter_sim/src/simulation/core/node.rs

//! The dispatch thread that owns the control loop.
//!
//! Every inbound event goes through one bounded channel to a single thread
//! that holds the `FrameOrchestrator`. The thread handles each event to
//! completion before taking the next and answers with the outbound batch plus
//! a snapshot of the loop state, so no other thread ever touches core state.

use crossbeam_channel::{bounded, Receiver, Sender};
use loiter_core::messages::{InboundEvent, OutboundMessage};
use loiter_core::orchestrator::FrameOrchestrator;
use loiter_core::types::HoldTarget;
use std::thread::{self, JoinHandle};
use tracing::debug;

use crate::simulation::core::error::SimError;

/// Loop state observed right after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopStatus {
    pub localizing: bool,
    pub initializing: bool,
    pub holding: bool,
    pub hold_target: Option<HoldTarget>,
    pub confidence_counter: i32,
}

impl LoopStatus {
    fn observe(orchestrator: &FrameOrchestrator) -> Self {
        Self {
            localizing: orchestrator.is_localizing(),
            initializing: orchestrator.is_initializing(),
            holding: orchestrator.is_holding(),
            hold_target: orchestrator.hold_target().copied(),
            confidence_counter: orchestrator.confidence_counter(),
        }
    }
}

/// Everything the dispatch thread sends back for one event.
#[derive(Debug, Clone)]
pub struct NodeReply {
    pub outbound: Vec<OutboundMessage>,
    pub status: LoopStatus,
}

/// Handle to the dispatch thread.
pub struct ControlNode {
    event_tx: Sender<InboundEvent>,
    reply_rx: Receiver<NodeReply>,
    handle: JoinHandle<()>,
}

impl ControlNode {
    /// Moves the orchestrator onto its own thread.
    ///
    /// # Arguments
    /// * `capacity`: bound of the inbound event queue. Producers block once
    ///   it is full.
    pub fn spawn(orchestrator: FrameOrchestrator, capacity: usize) -> Result<Self, SimError> {
        let (event_tx, event_rx) = bounded::<InboundEvent>(capacity);
        let (reply_tx, reply_rx) = bounded::<NodeReply>(capacity);

        let handle = thread::Builder::new()
            .name("loiter-dispatch".into())
            .spawn(move || run_dispatch(orchestrator, event_rx, reply_tx))?;

        Ok(Self {
            event_tx,
            reply_rx,
            handle,
        })
    }

    /// Sends one event and waits for its reply.
    pub fn request(&self, event: InboundEvent) -> Result<NodeReply, SimError> {
        self.event_tx
            .send(event)
            .map_err(|_| SimError::ChannelClosed)?;
        self.reply_rx.recv().map_err(|_| SimError::ChannelClosed)
    }

    /// Closes the event queue and waits for the thread to drain and exit.
    pub fn shutdown(self) -> Result<(), SimError> {
        drop(self.event_tx);
        self.handle.join().map_err(|_| SimError::DispatchPanicked)
    }
}

fn run_dispatch(
    mut orchestrator: FrameOrchestrator,
    event_rx: Receiver<InboundEvent>,
    reply_tx: Sender<NodeReply>,
) {
    for event in event_rx.iter() {
        let outbound = orchestrator.handle(&event);
        let status = LoopStatus::observe(&orchestrator);
        if reply_tx.send(NodeReply { outbound, status }).is_err() {
            break;
        }
    }
    debug!("Dispatch thread exiting.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::structs::PerceptionConfig;
    use crate::simulation::plugins::perception::{
        render_frame, SharedTruth, SyntheticDetector, SyntheticLocalizer,
    };
    use loiter_core::config::ControlConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn node() -> ControlNode {
        let config = ControlConfig::default();
        let perception = PerceptionConfig::default();
        let truth = SharedTruth::default();
        let orchestrator = FrameOrchestrator::new(
            &config,
            Box::new(SyntheticDetector::new(&perception, ChaCha8Rng::seed_from_u64(1))),
            Box::new(
                SyntheticLocalizer::new(
                    &perception,
                    config.confidence.uninformative_weight,
                    truth,
                    ChaCha8Rng::seed_from_u64(2),
                )
                .unwrap(),
            ),
        )
        .unwrap();
        ControlNode::spawn(orchestrator, 4).unwrap()
    }

    #[test]
    fn test_round_trip_reports_state() {
        let node = node();

        let reply = node.request(InboundEvent::Frame(render_frame(0.0))).unwrap();
        assert_eq!(reply.outbound.len(), 1);
        assert!(!reply.status.localizing);

        let reply = node.request(InboundEvent::Reset).unwrap();
        assert!(reply.outbound.is_empty());
        assert!(reply.status.localizing && reply.status.initializing);

        node.request(InboundEvent::ToggleHold).unwrap();
        node.request(InboundEvent::Frame(render_frame(0.05))).unwrap();
        let reply = node.request(InboundEvent::Frame(render_frame(0.1))).unwrap();
        assert!(reply.status.holding);
        assert!(reply.status.hold_target.is_some());
        assert!(reply.outbound.iter().any(|m| m.is_snapshot()));
        assert_eq!(reply.status.confidence_counter, 1);

        node.shutdown().unwrap();
    }
}
