use sl_core::LifecycleHandle;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{error, info, warn};

/// Exit code when a second signal cuts the teardown short.
const FORCED_EXIT_CODE: i32 = 130;

/// Turn SIGINT/SIGTERM into a confirmed exit request. A second signal while
/// the teardown is running terminates the launcher immediately.
pub fn spawn_signal_handler(handle: LifecycleHandle) {
    std::thread::spawn(move || {
        let mut signals = match Signals::new([SIGINT, SIGTERM]) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to register signal handlers: {e}");
                return;
            }
        };

        let mut requested = false;
        for sig in signals.forever() {
            if requested {
                warn!("Received signal {sig} again, exiting now");
                std::process::exit(FORCED_EXIT_CODE);
            }

            info!("Received signal {sig}, shutting down...");
            requested = true;

            if let Err(e) = handle.blocking_request_exit() {
                error!("Failed to request exit on signal: {e}");
                std::process::exit(FORCED_EXIT_CODE);
            }
        }
    });
}
