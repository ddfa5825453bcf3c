//! `pv` - manage prompt variables from the command line

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
