use super::{describe, System};
use crate::error::{Error, Result, Subject};
use crate::node::Index;
use crate::ordered::OrderedList;
use crate::tracer::{Stage, Tracer};
use crate::util::Shared;

/// A callback run before or after the systems of a [`Phase`].
pub type Callback = Box<dyn FnMut() -> anyhow::Result<()>>;

/// A named, ordered group of systems.
pub struct Phase {
    name:        String,
    pre_update:  Option<Callback>,
    post_update: Option<Callback>,
    systems:     OrderedList<dyn System>,
}

impl Phase {
    /// Creates an empty phase without callbacks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:        name.into(),
            pre_update:  None,
            post_update: None,
            systems:     OrderedList::default(),
        }
    }

    /// Sets the callback run before the systems of every update.
    pub fn with_pre_update(mut self, f: impl FnMut() -> anyhow::Result<()> + 'static) -> Self {
        self.pre_update = Some(Box::new(f));
        self
    }

    /// Sets the callback run after the systems of every update.
    pub fn with_post_update(mut self, f: impl FnMut() -> anyhow::Result<()> + 'static) -> Self {
        self.post_update = Some(Box::new(f));
        self
    }

    /// The debug name of the phase.
    pub fn name(&self) -> &str { &self.name }

    /// Returns whether this exact system instance is in the phase.
    pub fn has_system(&self, system: &Shared<dyn System>) -> bool { self.systems.has(system) }

    /// Adds a system with the priority key `order`.
    ///
    /// Systems run in ascending key order.
    /// Systems with equal keys run in the order they were added.
    pub fn add_system(&mut self, system: Shared<dyn System>, order: usize) -> Result<()> {
        if self.has_system(&system) {
            return Err(Error::AlreadyPresent(self.subject(&system)));
        }

        log::debug!("Added system {} to phase {} with order {order}", describe(&system), self.name);
        self.systems.insert(system, order);
        Ok(())
    }

    /// Adds a system with the current number of systems as its key.
    pub fn push_system(&mut self, system: Shared<dyn System>) -> Result<()> {
        let order = self.systems.len();
        self.add_system(system, order)
    }

    /// Pushes each system in turn, stopping at the first duplicate.
    pub fn push_systems(
        &mut self,
        systems: impl IntoIterator<Item = Shared<dyn System>>,
    ) -> Result<()> {
        systems.into_iter().try_for_each(|system| self.push_system(system))
    }

    /// Removes a system, returning its handle.
    pub fn remove_system(&mut self, system: &Shared<dyn System>) -> Result<Shared<dyn System>> {
        let removed =
            self.systems.remove(system).ok_or_else(|| Error::NotFound(self.subject(system)))?;
        log::debug!("Removed system {} from phase {}", describe(&removed), self.name);
        Ok(removed)
    }

    /// Iterates over the systems in execution order.
    pub fn systems(&self) -> impl Iterator<Item = &Shared<dyn System>> + '_ { self.systems.iter() }

    /// Runs the pre-update callback, every system in order, then the post-update callback.
    ///
    /// Each step is isolated: a failing callback or system is logged and reported to `tracer`,
    /// and the phase carries on with the next step.
    /// A system that is already borrowed counts as a failing system.
    pub fn update(&mut self, index: &dyn Index, tracer: &impl Tracer) {
        tracer.start_phase(&self.name);

        if let Some(pre_update) = &mut self.pre_update {
            if let Err(err) = pre_update() {
                log::error!("Failed to complete phase '{}' pre-update: {err:?}", self.name);
                tracer.callback_failed(&self.name, Stage::PreUpdate, &err);
            }
        }

        for (position, system) in self.systems.iter().enumerate() {
            let mut system = match system.try_borrow_mut() {
                Ok(system) => system,
                Err(_) => {
                    let label = format!("#{position}");
                    let err = anyhow::anyhow!("system {label} is already borrowed");
                    log::error!("Failed to run a system in phase '{}': {err}", self.name);
                    tracer.system_failed(&self.name, &label, &err);
                    continue;
                }
            };

            let nodes = index.get_nodes_with_schema(system.meta().node_schema());
            let name = system.meta().name().to_string();
            tracer.start_system(&self.name, &name, nodes.len());

            if let Err(err) = system.update_nodes(&nodes) {
                log::error!("Failed to complete system '{name}' update: {err:?}");
                tracer.system_failed(&self.name, &name, &err);
            }

            tracer.end_system(&self.name, &name);
        }

        if let Some(post_update) = &mut self.post_update {
            if let Err(err) = post_update() {
                log::error!("Failed to complete phase '{}' post-update: {err:?}", self.name);
                tracer.callback_failed(&self.name, Stage::PostUpdate, &err);
            }
        }

        tracer.end_phase(&self.name);
    }

    fn subject(&self, system: &Shared<dyn System>) -> Subject {
        Subject::System { system: describe(system), phase: self.name.clone() }
    }
}
