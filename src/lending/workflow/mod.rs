pub mod orchestrator;
pub mod report;
pub mod step;

pub use orchestrator::LendingWorkflow;
pub use report::{PositionSnapshot, WorkflowReport};
pub use step::WorkflowStep;
