//! Port allocation and availability checking.

use crate::{LifecycleError, LifecycleResult, PortAssignment, PortField};

use std::collections::HashSet;
use std::net::{Ipv4Addr, TcpListener};
use std::sync::Arc;

/// Liveness probe: is anything bound to this port on the local host?
pub trait PortProbe: Send + Sync {
    fn is_free(&self, port: u16) -> bool;
}

/// Probes by binding a listener and dropping it immediately.
///
/// Both the wildcard and the loopback address are tried, so a port held by a
/// process listening on either one counts as taken.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpPortProbe;

impl PortProbe for TcpPortProbe {
    fn is_free(&self, port: u16) -> bool {
        // Each listener is dropped at the end of its statement.
        let wildcard_free = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).is_ok();
        if !wildcard_free {
            return false;
        }
        TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
    }
}

/// Finds usable, non-colliding ports for the web container and database.
#[derive(Clone)]
pub struct PortAllocator {
    probe: Arc<dyn PortProbe>,
    max_port: u16,
}

impl PortAllocator {
    pub fn new(probe: Arc<dyn PortProbe>, max_port: u16) -> Self {
        Self { probe, max_port }
    }

    pub fn with_tcp_probe(max_port: u16) -> Self {
        Self::new(Arc::new(TcpPortProbe), max_port)
    }

    pub fn in_range(&self, port: u16) -> bool {
        port >= 1 && port <= self.max_port
    }

    /// True iff `port` is in range, free, and not `exclude_port`.
    pub fn is_port_usable(&self, port: u16, exclude_port: Option<u16>) -> bool {
        self.in_range(port) && exclude_port != Some(port) && self.probe.is_free(port)
    }

    /// Find the first free port at or above `preferred` that is not excluded.
    ///
    /// Algorithm:
    /// 1. Start at `preferred` (clamped to 1)
    /// 2. Skip excluded or bound ports, one at a time
    /// 3. Give up after `max_port`
    #[track_caller]
    pub fn find_available_port(
        &self,
        preferred: u16,
        exclude: &HashSet<u16>,
    ) -> LifecycleResult<u16> {
        let start = preferred.max(1);

        if start <= self.max_port {
            for port in start..=self.max_port {
                if !exclude.contains(&port) && self.probe.is_free(port) {
                    return Ok(port);
                }
            }
        }

        Err(LifecycleError::no_port_available(start, self.max_port))
    }

    /// Advance both preferred ports to usable values. The data port probe
    /// always excludes the web port that was just chosen.
    #[track_caller]
    pub fn allocate(&self, preferred: PortAssignment) -> LifecycleResult<PortAssignment> {
        let web_port = self.find_available_port(preferred.web_port, &HashSet::new())?;
        let data_port =
            self.find_available_port(preferred.data_port, &HashSet::from([web_port]))?;

        Ok(PortAssignment::new(web_port, data_port))
    }

    /// Last-moment check before a start. The web port is checked first.
    #[track_caller]
    pub fn validate(&self, ports: PortAssignment) -> LifecycleResult<()> {
        if !self.is_port_usable(ports.web_port, None) {
            return Err(LifecycleError::port_unavailable(
                PortField::Web,
                ports.web_port,
            ));
        }

        if !self.is_port_usable(ports.data_port, Some(ports.web_port)) {
            return Err(LifecycleError::port_unavailable(
                PortField::Data,
                ports.data_port,
            ));
        }

        Ok(())
    }
}
