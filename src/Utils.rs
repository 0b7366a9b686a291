//! different utility modules used throughout the project
/// logger set-up (terminal and optional file output)
pub mod logger;
