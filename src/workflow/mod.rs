mod checkpoint;
mod engine;

pub use checkpoint::SuspensionStore;
pub use engine::{ResumeOutcome, StartOutcome, WorkflowEngine};
