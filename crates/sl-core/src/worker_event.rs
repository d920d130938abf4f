use crate::LifecycleResult;

/// Completion notices from background process-manager calls.
#[derive(Debug)]
pub enum WorkerEvent {
    StartFinished(LifecycleResult<()>),
    StopFinished(LifecycleResult<()>),
    ExitFinished(LifecycleResult<()>),
    BrowserFinished(LifecycleResult<()>),
}
