// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

/// Configure the global tracing subscriber from the `-v` count, honoring
/// `RUST_LOG` as an override on top of the verbosity-derived default.
pub fn configure(verbose: u8) {
    let default_filter = match verbose {
        0 => "sfbuild=info,warn",
        1 => "sfbuild=debug,info",
        2 => "sfbuild=trace,info",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose > 2)
        .with_writer(std::io::stderr)
        .init();
}
