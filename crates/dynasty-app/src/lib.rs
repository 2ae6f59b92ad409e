// Library root for the dashboard binary: configuration, result cache, command
// orchestration and report rendering, exposed for integration tests.

pub mod app;
pub mod cache;
pub mod config;
pub mod report;
