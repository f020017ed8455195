// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Asset pipeline tasks for Pegasus
// Run with: cargo xtask assets <command>

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::{Builder, Env};
use pegasus_pipeline::config::DEFAULT_MANIFEST;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask", about = "Pegasus build tasks", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Asset pipeline management
    Assets {
        #[command(subcommand)]
        command: AssetsCommand,
    },
}

#[derive(Args)]
struct ProjectArgs {
    /// Path to the asset manifest
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum AssetsCommand {
    /// Compile every asset of the project
    Compile(ProjectArgs),
    /// Remove compiled assets, caches and the identifier list
    Clean(ProjectArgs),
    /// Show how the project resolves to assets without compiling
    List(ProjectArgs),
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Assets { command } => match command {
            AssetsCommand::Compile(args) => {
                init_logging(args.verbose);
                commands::assets::compile(&args.manifest)
            }
            AssetsCommand::Clean(args) => {
                init_logging(args.verbose);
                commands::assets::clean(&args.manifest)
            }
            AssetsCommand::List(args) => {
                init_logging(args.verbose);
                commands::assets::list(&args.manifest)
            }
        },
    }
}
