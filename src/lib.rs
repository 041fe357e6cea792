pub mod cli;
pub mod config;
pub mod crack;
pub mod platform;
pub mod prompt;
pub mod queue;
pub mod report;
pub mod runlog;
pub mod store;
pub mod util;
