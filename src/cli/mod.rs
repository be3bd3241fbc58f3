//! CLI module for Provision.
//!
//! Subcommands:
//! - `demo`: Wire the sample services and report how they were built
//! - `config`: Print the effective configuration

mod config;
mod demo;

use clap::{Parser, Subcommand};

pub use demo::{AService, BService, CService, DemoCommand, DemoReport, Reporter, SampleServices};

/// Provision - Dependency Injection Container
#[derive(Parser)]
#[command(name = "provision")]
#[command(about = "Dependency injection container with cached singletons")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Wire the sample services and print how they were built
    Demo(DemoCommand),

    /// Print the effective configuration as JSON
    Config,
}

impl App {
    /// Run the CLI application.
    pub fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Demo(ref cmd) => cmd.run(),
            Command::Config => self.run_config(),
        }
    }
}
