// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

mod cli;
mod driver;
mod error;
mod info;
mod logging;

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = cli::Cli::parse();
    logging::configure(cli.verbose);
    std::process::exit(driver::run(cli).await);
}
