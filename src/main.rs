//! Main Program for Gilshuffle
//! Run with `--help` for more instruction

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

mod shell;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Error};
use clap::{Args, Parser, Subcommand};
use gilshuffle::{ConfigBuilder, StoreEvent, Viewer};
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scramble images
    Forward(BatchArgs),
    /// Unscramble images
    Inverse(BatchArgs),
    /// Interactive session reading commands from stdin
    Shell(ShellArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Input files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory, files keep their names
    #[arg(short = 'd', long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ShellArgs {
    /// Maximum number of images kept open
    #[arg(short = 'c', long, default_value_t = gilshuffle::config::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Folder for direct save and save-all
    #[arg(short = 'd', long, default_value = ".")]
    save_dir: PathBuf,

    /// Save without asking for a path
    #[arg(long)]
    direct_save: bool,

    /// Close images after saving them
    #[arg(long)]
    save_and_clean: bool,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match cli.cmd {
        Command::Forward(args) => batch(args, true),
        Command::Inverse(args) => batch(args, false),
        Command::Shell(args) => {
            let config = ConfigBuilder::new()
                .capacity(args.capacity)
                .save_dir(args.save_dir)
                .direct_save(args.direct_save)
                .save_and_clean(args.save_and_clean)
                .build();
            let mut viewer = viewer(config);
            shell::run(&mut viewer, io::stdin().lock(), io::stdout().lock())
        }
    }
}

fn viewer(config: gilshuffle::Config) -> Viewer {
    let mut viewer = Viewer::new(config);
    viewer
        .store_mut()
        .subscribe(Box::new(|e: &StoreEvent| debug!(event = ?e, "store event")));
    viewer
}

fn batch(args: BatchArgs, forward: bool) -> Result<(), Error> {
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let config = ConfigBuilder::new()
        .capacity(args.inputs.len())
        .save_dir(&args.out_dir)
        .build();
    let mut viewer = viewer(config);

    viewer.open_all(&args.inputs).context("load inputs")?;
    if forward {
        viewer.store_mut().apply_forward_all()?;
    } else {
        viewer.store_mut().apply_inverse_all()?;
    }

    for p in viewer.save_all().context("save outputs")? {
        eprintln!("wrote {}", p.display());
    }
    Ok(())
}
