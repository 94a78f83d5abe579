pub mod orchestration;

pub use orchestration::{run_workflow, WorkflowArgs, WorkflowResult};
