//! Stencil: edit remote content templates with any local editor.
//!
//! # Usage
//!
//! ```text
//! stencil --token <TOKEN> [--env localhost|development|production] [--path <DIR>]
//!         [--flush-on-exit] [--debounce-ms <MS>]
//! ```
//!
//! The session mirrors every template into a fresh workspace directory,
//! pushes local edits back, and deletes the workspace on exit.

mod launch;

use anyhow::Result;
use clap::Parser;

use launch::LaunchArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stencil",
    version,
    about = "Edit remote content templates with any local editor",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    launch: LaunchArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.launch.run()
}
