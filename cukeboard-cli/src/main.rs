// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use cukeboard_cli::{CukeboardApp, OutputWriter};

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = CukeboardApp::parse();
    app.exec(&mut OutputWriter::default())
}
