//! One-shot database mode choice.

use crate::{DatabaseMode, LifecycleError, LifecycleResult, UserInterface};

use tracing::info;

/// Holds the session's database mode. Once chosen it cannot be unchosen,
/// and once the server has started it cannot change at all.
#[derive(Debug, Default)]
pub struct ModeSelector {
    selected: Option<DatabaseMode>,
    locked: bool,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<DatabaseMode> {
        self.selected
    }

    /// Mode handed to the process manager; `NoChanges` unless one was chosen.
    pub fn effective(&self) -> DatabaseMode {
        self.selected.unwrap_or_default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[track_caller]
    pub fn select(&mut self, mode: DatabaseMode) -> LifecycleResult<()> {
        if self.locked {
            return Err(LifecycleError::mode_locked());
        }

        if let Some(current) = self.selected {
            return Err(LifecycleError::mode_already_selected(current));
        }

        info!("Database mode selected: {mode}");
        self.selected = Some(mode);
        Ok(())
    }

    /// Ask the user once. A mode chosen earlier (e.g. on the command line)
    /// is returned without prompting.
    pub async fn present(&mut self, ui: &dyn UserInterface) -> LifecycleResult<DatabaseMode> {
        if let Some(mode) = self.selected {
            return Ok(mode);
        }

        let mode = ui.show_initial_config().await;
        self.select(mode)?;
        Ok(mode)
    }

    /// Freeze the choice for the rest of the session and return it.
    pub fn lock(&mut self) -> DatabaseMode {
        self.locked = true;
        self.effective()
    }
}
