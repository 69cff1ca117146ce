pub mod cli;
pub mod env;
pub mod log;
pub mod workflow_config;

pub use cli::Cli;
pub use workflow_config::WorkflowConfig;
