use crate::tests::FakeProbe;
use crate::{PortAllocator, PortAssignment, PortProbe};

use std::collections::HashSet;
use std::sync::Arc;

use proptest::collection::{hash_set, vec};
use proptest::prelude::*;

/// Small port space so busy sets can cover all of it.
const SPACE: u16 = 300;

/// Busy ports as a bitmap over `1..=SPACE`; `density` is the chance a port
/// is taken.
fn busy_ports(density: f64) -> impl Strategy<Value = HashSet<u16>> {
    vec(prop::bool::weighted(density), SPACE as usize).prop_map(|taken| {
        (1..=SPACE)
            .zip(taken)
            .filter_map(|(port, taken)| taken.then_some(port))
            .collect()
    })
}

fn allocator(max_port: u16, busy: &HashSet<u16>) -> (PortAllocator, Arc<FakeProbe>) {
    let busy: Vec<u16> = busy.iter().copied().collect();
    let network = Arc::new(FakeProbe::with_busy(&busy));
    let allocator = PortAllocator::new(Arc::clone(&network) as Arc<dyn PortProbe>, max_port);
    (allocator, network)
}

// =========================================================================
// Property-Based Tests - Port Allocation
// =========================================================================

proptest! {
    #[test]
    fn given_any_preferred_port_when_find_then_free_port_at_or_above_it(
        max_port in 1u16..=SPACE,
        preferred in 0u16..=SPACE + 20,
        busy in busy_ports(0.9),
        exclude in hash_set(1u16..=SPACE, 0..4),
    ) {
        let (allocator, network) = allocator(max_port, &busy);

        match allocator.find_available_port(preferred, &exclude) {
            Ok(port) => {
                prop_assert!(port >= preferred.max(1));
                prop_assert!(port <= max_port);
                prop_assert!(network.is_free(port));
                prop_assert!(!exclude.contains(&port));
            }
            Err(_) => {
                let start = preferred.max(1);
                prop_assert!(
                    (start..=max_port).all(|p| busy.contains(&p) || exclude.contains(&p))
                );
            }
        }
    }

    #[test]
    fn given_any_preferred_pair_when_allocate_then_distinct_free_ports(
        web in 1u16..=SPACE,
        data in 1u16..=SPACE,
        busy in busy_ports(0.5),
    ) {
        let (allocator, network) = allocator(SPACE, &busy);

        if let Ok(ports) = allocator.allocate(PortAssignment::new(web, data)) {
            prop_assert_ne!(ports.web_port, ports.data_port);
            prop_assert!(ports.web_port >= web);
            prop_assert!(ports.data_port >= data);
            prop_assert!(network.is_free(ports.web_port));
            prop_assert!(network.is_free(ports.data_port));
            prop_assert!(allocator.validate(ports).is_ok());
        }
    }

    #[test]
    fn given_same_preferred_ports_when_allocate_then_data_moves_past_web(
        port in 1u16..SPACE,
    ) {
        let (allocator, _network) = allocator(SPACE, &HashSet::new());

        let ports = allocator.allocate(PortAssignment::new(port, port)).unwrap();

        prop_assert_eq!(ports.web_port, port);
        prop_assert_eq!(ports.data_port, port + 1);
    }
}
