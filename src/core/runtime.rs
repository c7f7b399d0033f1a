use super::Core;
use crate::error::{Error, Result, Subject};

/// Holds at most one [`Core`] for the lifetime of a host.
///
/// Initializing twice or accessing the core before initialization fails loudly
/// instead of silently replacing or creating an instance.
#[derive(Default)]
pub struct Runtime {
    core: Option<Core>,
}

impl Runtime {
    /// Installs `core`.
    ///
    /// Fails with [`Error::AlreadyPresent`] if a core is already installed;
    /// `core` is dropped in that case.
    pub fn initialize(&mut self, core: Core) -> Result<()> {
        if self.core.is_some() {
            return Err(Error::AlreadyPresent(Subject::Core));
        }

        log::debug!("Core initialized");
        self.core = Some(core);
        Ok(())
    }

    /// Returns whether a core is installed.
    pub fn is_initialized(&self) -> bool { self.core.is_some() }

    /// Gets the installed core.
    pub fn get(&self) -> Result<&Core> { self.core.as_ref().ok_or(Error::NotFound(Subject::Core)) }

    /// Gets the installed core mutably.
    pub fn get_mut(&mut self) -> Result<&mut Core> {
        self.core.as_mut().ok_or(Error::NotFound(Subject::Core))
    }

    /// Uninstalls and returns the core.
    ///
    /// Fails with [`Error::NotFound`] if no core is installed.
    pub fn shutdown(&mut self) -> Result<Core> {
        let core = self.core.take().ok_or(Error::NotFound(Subject::Core))?;
        log::debug!("Core shut down");
        Ok(core)
    }
}
