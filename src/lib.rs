//! Interpose command line: a demo bootstrapper for the interception kernel.

pub mod cli;
pub mod config;
pub mod demo;
