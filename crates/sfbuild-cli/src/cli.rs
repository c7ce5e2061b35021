// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Parser;

/// Execute a SymbiFlow platform flow.
#[derive(Debug, Parser)]
#[command(name = "sfbuild", version, about)]
pub struct Cli {
    /// Path to the project flow definition file
    #[arg(value_name = "FLOW_PATH")]
    pub flow_path: PathBuf,

    /// Perform the stages necessary to acquire this target
    #[arg(short, long, value_name = "TARGET_NAME")]
    pub target: Option<String>,

    /// Target platform name
    #[arg(short, long, value_name = "PLATFORM_NAME")]
    pub platform: String,

    /// Show dependency resolution without executing the flow
    #[arg(short = 'P', long)]
    pub pretend: bool,

    /// Display info about available targets and exit
    #[arg(short, long)]
    pub info: bool,

    /// Specify stage inputs explicitly, as `name=path[,name=path...]`
    ///
    /// Reserved for compatibility with the reference CLI surface; not yet
    /// merged into dependency resolution.
    #[arg(short = 'T', long = "take-explicit-paths", value_delimiter = ',')]
    pub take_explicit_paths: Vec<String>,

    /// Increase log verbosity; may be given more than once
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
