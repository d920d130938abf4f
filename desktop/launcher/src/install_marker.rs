use crate::error::{LauncherError, LauncherResult};

use sl_core::{DatabaseMode, LifecycleHandle, ServerState, StateSubscription};

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use error_location::ErrorLocation;
use tracing::{info, warn};

pub const MARKER_FILENAME: &str = ".initialized";

/// Records that the database setup choice has been made in a config
/// directory. Its absence means a fresh install.
#[derive(Debug, Clone)]
pub struct InstallMarker {
    path: PathBuf,
}

impl InstallMarker {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(MARKER_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_fresh_install(&self) -> bool {
        !self.path.exists()
    }

    #[track_caller]
    pub fn mark_initialized(&self, mode: DatabaseMode) -> LauncherResult<()> {
        let location = ErrorLocation::from(Location::caller());

        std::fs::write(&self.path, format!("database_mode = \"{mode}\"\n")).map_err(|source| {
            LauncherError::Marker {
                path: self.path.clone(),
                source,
                location,
            }
        })?;

        info!("Install marked initialized at {}", self.path.display());
        Ok(())
    }

    /// Write the marker with the active database mode the first time the
    /// server reaches `Running`. Until then the install stays fresh, so a
    /// setup choice whose first start never succeeds is offered again.
    pub fn mark_on_first_run(&self, handle: &LifecycleHandle) -> StateSubscription {
        let marker = self.clone();
        let written = AtomicBool::new(false);

        handle.on_state_changed(move |snapshot| {
            if snapshot.state != ServerState::Running || written.swap(true, Ordering::SeqCst) {
                return;
            }

            if let Err(e) = marker.mark_initialized(snapshot.mode) {
                warn!(
                    "Could not record the database setup at {}: {e}",
                    marker.path().display()
                );
            }
        })
    }
}
