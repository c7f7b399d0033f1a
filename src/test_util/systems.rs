use std::cell::RefCell;

use crate::tracer::{Stage, Tracer};

/// An owned copy of a [`Tracer`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    StartTick,
    EndTick,
    StartPhase(String),
    EndPhase(String),
    PhaseBusy(usize),
    StartSystem { phase: String, system: String, nodes: usize },
    EndSystem { phase: String, system: String },
    SystemFailed { phase: String, system: String, error: String },
    CallbackFailed { phase: String, stage: Stage, error: String },
}

/// A tracer that stores every event it receives.
#[derive(Default)]
pub struct RecordingTracer {
    events: RefCell<Vec<TraceEvent>>,
}

impl RecordingTracer {
    pub fn take(&self) -> Vec<TraceEvent> { self.events.take() }

    fn push(&self, event: TraceEvent) { self.events.borrow_mut().push(event) }
}

impl Tracer for RecordingTracer {
    fn start_tick(&self) { self.push(TraceEvent::StartTick) }

    fn end_tick(&self) { self.push(TraceEvent::EndTick) }

    fn start_phase(&self, phase: &str) { self.push(TraceEvent::StartPhase(phase.to_string())) }

    fn end_phase(&self, phase: &str) { self.push(TraceEvent::EndPhase(phase.to_string())) }

    fn phase_busy(&self, position: usize) { self.push(TraceEvent::PhaseBusy(position)) }

    fn start_system(&self, phase: &str, system: &str, nodes: usize) {
        self.push(TraceEvent::StartSystem {
            phase: phase.to_string(),
            system: system.to_string(),
            nodes,
        })
    }

    fn end_system(&self, phase: &str, system: &str) {
        self.push(TraceEvent::EndSystem { phase: phase.to_string(), system: system.to_string() })
    }

    fn system_failed(&self, phase: &str, system: &str, error: &anyhow::Error) {
        self.push(TraceEvent::SystemFailed {
            phase:  phase.to_string(),
            system: system.to_string(),
            error:  error.to_string(),
        })
    }

    fn callback_failed(&self, phase: &str, stage: Stage, error: &anyhow::Error) {
        self.push(TraceEvent::CallbackFailed {
            phase: phase.to_string(),
            stage,
            error: error.to_string(),
        })
    }
}
