use std::fmt;
use std::str::FromStr;

/// How the database is prepared on the first start of a fresh install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatabaseMode {
    /// Use the database exactly as shipped
    #[default]
    NoChanges,
    /// Start from an empty database
    EmptyDatabase,
    /// Hand every database decision to the external setup wizard
    UseInitializationWizard,
}

impl DatabaseMode {
    pub const ALL: [DatabaseMode; 3] = [
        DatabaseMode::NoChanges,
        DatabaseMode::EmptyDatabase,
        DatabaseMode::UseInitializationWizard,
    ];

    /// Value passed to the server process environment.
    pub fn as_env_value(&self) -> &'static str {
        match self {
            Self::NoChanges => "no_changes",
            Self::EmptyDatabase => "empty_database",
            Self::UseInitializationWizard => "use_initialization_wizard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoChanges => "Do not modify the database",
            Self::EmptyDatabase => "Starter implementation",
            Self::UseInitializationWizard => "Expert mode",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NoChanges => "Keep the bundled database as it is.",
            Self::EmptyDatabase => {
                "Configure with an empty database. A good place to start a new system."
            }
            Self::UseInitializationWizard => "Go through the initial setup wizard yourself.",
        }
    }
}

impl fmt::Display for DatabaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_env_value())
    }
}

impl FromStr for DatabaseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "no_changes" | "none" => Ok(Self::NoChanges),
            "empty_database" | "empty" => Ok(Self::EmptyDatabase),
            "use_initialization_wizard" | "wizard" | "expert" => {
                Ok(Self::UseInitializationWizard)
            }
            other => Err(format!(
                "unknown database mode '{other}' (expected no-changes, empty-database or wizard)"
            )),
        }
    }
}
