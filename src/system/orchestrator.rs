use super::Phase;
use crate::error::{Error, Result, Subject};
use crate::node::Index;
use crate::ordered::OrderedList;
use crate::tracer::Tracer;
use crate::util::Shared;

/// Orders the phases of a tick.
#[derive(Default)]
pub struct Orchestrator {
    phases: OrderedList<Phase>,
}

impl Orchestrator {
    /// Returns whether this exact phase instance is orchestrated.
    pub fn has_phase(&self, phase: &Shared<Phase>) -> bool { self.phases.has(phase) }

    /// Adds a phase with the priority key `order`.
    ///
    /// Phases run in ascending key order.
    /// Phases with equal keys run in the order they were added.
    pub fn add_phase(&mut self, phase: Shared<Phase>, order: usize) -> Result<()> {
        if self.has_phase(&phase) {
            return Err(Error::AlreadyPresent(subject(&phase)));
        }

        log::debug!("Added phase {} with order {order}", describe(&phase));
        self.phases.insert(phase, order);
        Ok(())
    }

    /// Adds a phase with the current number of phases as its key.
    pub fn push_phase(&mut self, phase: Shared<Phase>) -> Result<()> {
        let order = self.phases.len();
        self.add_phase(phase, order)
    }

    /// Pushes each phase in turn, stopping at the first duplicate.
    pub fn push_phases(&mut self, phases: impl IntoIterator<Item = Shared<Phase>>) -> Result<()> {
        phases.into_iter().try_for_each(|phase| self.push_phase(phase))
    }

    /// Removes a phase, returning its handle.
    pub fn remove_phase(&mut self, phase: &Shared<Phase>) -> Result<Shared<Phase>> {
        let removed = self.phases.remove(phase).ok_or_else(|| Error::NotFound(subject(phase)))?;
        log::debug!("Removed phase {}", describe(&removed));
        Ok(removed)
    }

    /// Iterates over the phases in execution order.
    pub fn phases(&self) -> impl Iterator<Item = &Shared<Phase>> + '_ { self.phases.iter() }

    /// Runs one tick: every phase in order.
    ///
    /// Phases isolate their own failures, so every phase always runs.
    /// A phase that is already borrowed is logged and skipped.
    pub fn update(&self, index: &dyn Index, tracer: &impl Tracer) {
        tracer.start_tick();

        for (position, phase) in self.phases.iter().enumerate() {
            match phase.try_borrow_mut() {
                Ok(mut phase) => phase.update(index, tracer),
                Err(_) => {
                    log::error!("Phase #{position} is already borrowed, skipping it");
                    tracer.phase_busy(position);
                }
            }
        }

        tracer.end_tick();
    }
}

fn describe(phase: &Shared<Phase>) -> String {
    match phase.try_borrow() {
        Ok(phase) => phase.name().to_string(),
        Err(_) => String::from("<borrowed phase>"),
    }
}

fn subject(phase: &Shared<Phase>) -> Subject { Subject::Phase(describe(phase)) }
