pub mod ledger;
pub mod model;
pub mod protocol;
pub mod registry;
pub mod services;
pub mod units;
pub mod workflow;
