//! Workflow entry points used by the binary

pub mod orchestration;

pub use orchestration::{
    run_release_workflow, ReleaseArgs, ReleaseAttempt, ReleaseOrchestrator, ReleaseState,
    WorkflowOptions, WorkflowOutcome,
};
