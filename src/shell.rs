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

//! Line-oriented session driving a [`Viewer`].

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use gilshuffle::Viewer;

const HELP: &str = "\
commands:
  open <path>...        load images (newest is selected)
  next | prev           move selection
  select <index>        select by index
  list                  show loaded images
  forward [all]         scramble current (or every) image
  inverse [all]         unscramble current (or every) image
  revert [all]          restore original pixels
  save [path]           save current image
  save-all              save every image into the save folder
  remove                drop current image
  clear                 drop every image
  delete-source         delete current image's file and drop it
  help                  this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Open(Vec<PathBuf>),
    Next,
    Prev,
    Select(usize),
    List,
    Forward { all: bool },
    Inverse { all: bool },
    Revert { all: bool },
    Save(Option<PathBuf>),
    SaveAll,
    Remove,
    Clear,
    DeleteSource,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Option<Command>, Error> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();
    let all = match rest.as_slice() {
        [] => false,
        ["all"] => true,
        _ if matches!(head, "forward" | "inverse" | "revert") => {
            bail!("`{head}` takes only `all`")
        }
        _ => false,
    };

    let cmd = match head {
        "open" if rest.is_empty() => bail!("`open` needs at least one path"),
        "open" => Command::Open(rest.iter().map(PathBuf::from).collect()),
        "next" => Command::Next,
        "prev" => Command::Prev,
        "select" => {
            let [index] = rest.as_slice() else {
                bail!("`select` needs one index");
            };
            Command::Select(index.parse().context("bad index")?)
        }
        "list" => Command::List,
        "forward" => Command::Forward { all },
        "inverse" => Command::Inverse { all },
        "revert" => Command::Revert { all },
        // Paths may contain spaces.
        "save" => Command::Save((!rest.is_empty()).then(|| PathBuf::from(rest.join(" ")))),
        "save-all" => Command::SaveAll,
        "remove" => Command::Remove,
        "clear" => Command::Clear,
        "delete-source" => Command::DeleteSource,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => bail!("unknown command `{head}`, try `help`"),
    };
    Ok(Some(cmd))
}

/// Runs commands from `input` until it ends or `quit` is read.
pub fn run<R: BufRead, W: Write>(viewer: &mut Viewer, input: R, mut out: W) -> Result<(), Error> {
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };

        let cmd = match parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "error: {e:#}")?;
                continue;
            }
        };
        if cmd == Command::Quit {
            break;
        }

        // Non-direct save asks for a path on the next line.
        let cmd = match cmd {
            Command::Save(None) if !viewer.config().direct_save => {
                let Some(default) = viewer.default_target() else {
                    writeln!(out, "error: no image selected")?;
                    continue;
                };
                write!(out, "save as [{}]: ", default.display())?;
                out.flush()?;
                let answer = lines.next().transpose()?.unwrap_or_default();
                let answer = answer.trim();
                Command::Save((!answer.is_empty()).then(|| PathBuf::from(answer)))
            }
            cmd => cmd,
        };

        if let Err(e) = execute(viewer, cmd, &mut out) {
            writeln!(out, "error: {e:#}")?;
        }
    }
    Ok(())
}

fn execute<W: Write>(viewer: &mut Viewer, cmd: Command, out: &mut W) -> Result<(), Error> {
    match cmd {
        Command::Open(paths) => {
            for p in paths {
                writeln!(out, "loading {}", p.display())?;
                viewer
                    .open(&p)
                    .with_context(|| format!("open '{}'", p.display()))?;
            }
            print_current(viewer, out)?;
        }
        Command::Next => {
            viewer.store_mut().next();
            print_current(viewer, out)?;
        }
        Command::Prev => {
            viewer.store_mut().previous();
            print_current(viewer, out)?;
        }
        Command::Select(i) => {
            if viewer.store_mut().set_current(i).is_none() {
                bail!("no image at index {i}");
            }
            print_current(viewer, out)?;
        }
        Command::List => print_list(viewer, out)?,
        Command::Forward { all: true } => viewer.store_mut().apply_forward_all()?,
        Command::Forward { all: false } => {
            viewer.store_mut().apply_forward_current()?;
        }
        Command::Inverse { all: true } => viewer.store_mut().apply_inverse_all()?,
        Command::Inverse { all: false } => {
            viewer.store_mut().apply_inverse_current()?;
        }
        Command::Revert { all: true } => viewer.store_mut().revert_all(),
        Command::Revert { all: false } => {
            viewer.store_mut().revert_current();
        }
        Command::Save(path) => {
            let written = viewer.save_current(path.as_deref())?;
            writeln!(out, "saved {}", written.display())?;
        }
        Command::SaveAll => {
            if viewer.store().is_empty() {
                return Ok(());
            }
            for p in viewer.save_all()? {
                writeln!(out, "saved {}", p.display())?;
            }
        }
        Command::Remove => {
            viewer.store_mut().remove_current();
            print_current(viewer, out)?;
        }
        Command::Clear => viewer.store_mut().remove_all(),
        Command::DeleteSource => {
            let p = viewer.delete_source()?;
            writeln!(out, "deleted {}", p.display())?;
            print_current(viewer, out)?;
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn print_current<W: Write>(viewer: &Viewer, out: &mut W) -> Result<(), Error> {
    let store = viewer.store();
    match (store.current_index(), store.current()) {
        (Some(i), Some(e)) => writeln!(
            out,
            "[{}/{}] {} ({}x{})",
            i + 1,
            store.len(),
            display_name(e.identifier()),
            e.width(),
            e.height()
        )?,
        _ => writeln!(out, "no image selected")?,
    }
    Ok(())
}

fn print_list<W: Write>(viewer: &Viewer, out: &mut W) -> Result<(), Error> {
    let store = viewer.store();
    for (i, e) in store.entries().enumerate() {
        let mark = if store.current_index() == Some(i) { '*' } else { ' ' };
        let modified = if e.is_modified() { " modified" } else { "" };
        writeln!(
            out,
            "{mark}{i:3} {} {}x{}{modified}",
            e.identifier(),
            e.width(),
            e.height()
        )?;
    }
    Ok(())
}

fn display_name(identifier: &str) -> std::borrow::Cow<'_, str> {
    Path::new(identifier)
        .file_name()
        .map_or(identifier.into(), |n| n.to_string_lossy())
}
