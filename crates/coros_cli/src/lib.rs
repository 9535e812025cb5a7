//! Command-line front end for the COROS session client.

pub mod args;
pub mod commands;

pub use commands::run;
