use crate::{LifecycleError, LifecycleResult};

use std::fmt;

/// Which of the two server ports a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortField {
    Web,
    Data,
}

impl PortField {
    /// Message shown when this port fails validation before a start.
    pub fn unavailable_message(&self) -> String {
        format!("The {self} port is not available. Please enter another one.")
    }

    /// Parse user-edited port text for this field.
    #[track_caller]
    pub fn parse(&self, text: &str) -> LifecycleResult<u16> {
        match text.trim().parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(LifecycleError::port_unavailable(*self, 0)),
        }
    }
}

impl fmt::Display for PortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Web => f.write_str("web server"),
            Self::Data => f.write_str("database"),
        }
    }
}

/// The web container and database ports used for one start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortAssignment {
    pub web_port: u16,
    pub data_port: u16,
}

impl PortAssignment {
    pub fn new(web_port: u16, data_port: u16) -> Self {
        Self {
            web_port,
            data_port,
        }
    }
}

impl From<&sl_config::PortsConfig> for PortAssignment {
    fn from(ports: &sl_config::PortsConfig) -> Self {
        Self::new(ports.web, ports.data)
    }
}

impl fmt::Display for PortAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "web={}, data={}", self.web_port, self.data_port)
    }
}
