pub mod chart;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod vintage;
