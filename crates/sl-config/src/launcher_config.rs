use crate::{ConfigError, ConfigErrorResult, DEFAULT_BROWSER_PATH, DEFAULT_TITLE};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Product name shown in the status title
    pub title: String,
    /// Path opened by "launch browser", appended to the web port URL
    pub browser_path: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            title: String::from(DEFAULT_TITLE),
            browser_path: String::from(DEFAULT_BROWSER_PATH),
        }
    }
}

impl LauncherConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::launcher("launcher.title cannot be empty"));
        }

        if !self.browser_path.starts_with('/') {
            return Err(ConfigError::launcher(format!(
                "launcher.browser_path must start with '/', got '{}'",
                self.browser_path
            )));
        }

        Ok(())
    }
}
