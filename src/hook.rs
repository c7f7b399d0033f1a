//! Synchronous multi-listener broadcast.
//!
//! Hooks are plain trait objects registered into a [`Dispatcher`].
//! Every broadcast invokes all listeners in registration order,
//! inline on the stack of the mutation that triggered it.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::util;

/// Identifies the event being broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A component was added to an entity.
    AddComponent,
    /// A component was removed from an entity.
    RemoveComponent,
    /// A node schema was registered.
    RegisterNodeSchema,
    /// A node schema was unregistered.
    UnregisterNodeSchema,
    /// An archetype was resolved for a node schema.
    RegisterSchemaArchetype,
    /// The cached archetype of a node schema was evicted.
    RemoveSchemaArchetype,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::AddComponent => "component addition",
            Self::RemoveComponent => "component removal",
            Self::RegisterNodeSchema => "node schema registration",
            Self::UnregisterNodeSchema => "node schema unregistration",
            Self::RegisterSchemaArchetype => "schema archetype registration",
            Self::RemoveSchemaArchetype => "schema archetype removal",
        })
    }
}

/// An ordered list of listeners of type `H`.
pub struct Dispatcher<H: ?Sized> {
    hooks: Vec<Rc<H>>,
}

impl<H: ?Sized> Default for Dispatcher<H> {
    fn default() -> Self { Self { hooks: Vec::new() } }
}

impl<H: ?Sized> Clone for Dispatcher<H> {
    fn clone(&self) -> Self { Self { hooks: self.hooks.clone() } }
}

impl<H: ?Sized> Dispatcher<H> {
    /// Appends a listener.
    ///
    /// The same listener may be added multiple times,
    /// in which case it is invoked once per registration.
    pub fn add(&mut self, hook: Rc<H>) { self.hooks.push(hook) }

    /// Removes the first registration of `hook`.
    ///
    /// Returns whether a registration was found.
    pub fn remove(&mut self, hook: &Rc<H>) -> bool {
        match self.hooks.iter().position(|other| util::same_rc(other, hook)) {
            Some(index) => {
                self.hooks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize { self.hooks.len() }

    /// Returns true if there are no listeners.
    pub fn is_empty(&self) -> bool { self.hooks.is_empty() }

    /// Invokes `call` on every listener in registration order.
    ///
    /// All listeners are invoked even if some of them fail.
    /// The first failure is returned as [`Error::Hook`]; subsequent ones are only logged.
    pub fn invoke(&self, event: Event, mut call: impl FnMut(&H) -> anyhow::Result<()>) -> Result<()> {
        let mut first_err = None;

        for hook in &self.hooks {
            if let Err(err) = call(&**hook) {
                if first_err.is_none() {
                    first_err = Some(err);
                } else {
                    log::error!("Another hook failed during {event}: {err:#}");
                }
            }
        }

        match first_err {
            Some(source) => Err(Error::Hook { event, source }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{Dispatcher, Event};
    use crate::error::Error;

    trait Ping {
        fn ping(&self, value: i32) -> anyhow::Result<()>;
    }

    struct Recorder {
        name: &'static str,
        log:  Rc<RefCell<Vec<(&'static str, i32)>>>,
        fail: bool,
    }

    impl Ping for Recorder {
        fn ping(&self, value: i32) -> anyhow::Result<()> {
            self.log.borrow_mut().push((self.name, value));
            if self.fail {
                anyhow::bail!("{} refused {value}", self.name);
            }
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        log: &Rc<RefCell<Vec<(&'static str, i32)>>>,
        fail: bool,
    ) -> Rc<dyn Ping> {
        Rc::new(Recorder { name, log: Rc::clone(log), fail })
    }

    #[test]
    fn test_registration_order() {
        let log = Rc::default();
        let mut dispatcher = Dispatcher::<dyn Ping>::default();
        dispatcher.add(recorder("a", &log, false));
        dispatcher.add(recorder("b", &log, false));
        dispatcher.add(recorder("c", &log, false));

        dispatcher.invoke(Event::AddComponent, |hook| hook.ping(1)).unwrap();
        assert_eq!(*log.borrow(), vec![("a", 1), ("b", 1), ("c", 1)]);
    }

    #[test]
    fn test_failure_does_not_skip_later_hooks() {
        let log = Rc::default();
        let mut dispatcher = Dispatcher::<dyn Ping>::default();
        dispatcher.add(recorder("a", &log, true));
        dispatcher.add(recorder("b", &log, true));
        dispatcher.add(recorder("c", &log, false));

        let err = dispatcher.invoke(Event::RemoveComponent, |hook| hook.ping(2)).unwrap_err();
        match err {
            Error::Hook { event, source } => {
                assert_eq!(event, Event::RemoveComponent);
                assert_eq!(source.to_string(), "a refused 2");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(*log.borrow(), vec![("a", 2), ("b", 2), ("c", 2)]);
    }

    #[test]
    fn test_remove_by_identity() {
        let log = Rc::default();
        let mut dispatcher = Dispatcher::<dyn Ping>::default();
        let a = recorder("a", &log, false);
        let twin = recorder("a", &log, false);
        dispatcher.add(Rc::clone(&a));
        dispatcher.add(Rc::clone(&twin));

        assert!(dispatcher.remove(&a));
        assert!(!dispatcher.remove(&a));
        assert_eq!(dispatcher.len(), 1);
    }
}
