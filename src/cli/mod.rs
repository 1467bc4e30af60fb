//! Command-line actions, independent of argument parsing

pub mod orchestration;

pub use orchestration::{
    run_docker_export, run_release_workflow, ReleaseOutcome, ReleaseStep, ReleaseWorkflowArgs,
};
