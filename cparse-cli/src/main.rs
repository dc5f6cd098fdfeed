// cparse-cli — demo binaries for the cparse lexical pipeline.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

mod config;

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use cparse::input::FileInput;
use cparse::{Event, Parser as CparseParser};

use crate::config::Config;

/// Demo front-ends over the `cparse` lexical pipeline: `slowcat` (cat a file
/// through the pipeline unchanged), `syntax-highlight` (colorize tokens from
/// the preprocessor token scanner), and `import-enum` (list identifiers).
#[derive(ClapParser, Debug)]
#[command(name = "cparse-cli", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Path to a `cparse.toml` config file (defaults to `./cparse.toml` if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print each event's source cursor alongside its text.
    #[arg(long, global = true)]
    cursors: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-emit a file's bytes unchanged, by draining the raw-stack scanner.
    Slowcat { file: PathBuf },
    /// Colorize tokens produced by the preprocessor token scanner.
    SyntaxHighlight { file: PathBuf },
    /// List every identifier the preprocessor token scanner observes.
    ImportEnum { file: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let filter = config
        .log_level
        .as_deref()
        .map(tracing_subscriber::EnvFilter::new)
        .unwrap_or_else(tracing_subscriber::EnvFilter::from_default_env);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let show_cursors = args.cursors || config.cursors.unwrap_or(false);

    match args.command {
        Command::Slowcat { file } => slowcat(&file, show_cursors),
        Command::SyntaxHighlight { file } => syntax_highlight(&file, show_cursors),
        Command::ImportEnum { file } => import_enum(&file),
    }
}

fn open_stream(file: &PathBuf) -> Result<FileInput> {
    FileInput::open(file).with_context(|| format!("opening {}", file.display()))
}

fn slowcat(file: &PathBuf, show_cursors: bool) -> Result<()> {
    let mut parser = CparseParser::new();
    let stdout = Rc::new(RefCell::new(std::io::stdout()));
    let out = Rc::clone(&stdout);
    parser
        .subscribe_raw_stack(Box::new(move |event: &Event| {
            if let Event::RawChar { cursor, byte } = event {
                let mut stdout = out.borrow_mut();
                if show_cursors {
                    write!(stdout, "{cursor}\t").ok();
                }
                stdout.write_all(&[*byte]).ok();
            }
            Ok(())
        }))?;
    parser
        .push_input_stream(file.display().to_string(), Box::new(open_stream(file)?))?;
    parser.run()?;
    Ok(())
}

fn token_color(event: &Event) -> &'static str {
    match event {
        Event::Identifier { .. } => "\x1b[36m",
        Event::RawInteger { .. } | Event::RawFloat { .. } => "\x1b[35m",
        Event::RawString { .. } | Event::RawCharLit { .. } => "\x1b[32m",
        Event::Punctuator { .. } => "\x1b[33m",
        _ => "\x1b[0m",
    }
}

fn token_text(event: &Event) -> Option<String> {
    match event {
        Event::Identifier { name, .. } => Some(name.clone()),
        Event::RawInteger { digits, .. } | Event::RawFloat { digits, .. } => Some(digits.clone()),
        Event::RawString { literal, .. } | Event::RawCharLit { literal, .. } => Some(literal.clone()),
        Event::Punctuator { kind, .. } => Some(format!("{kind:?}")),
        Event::Whitespace(_) => Some(" ".to_string()),
        Event::Newline(_) => Some("\n".to_string()),
        _ => None,
    }
}

fn syntax_highlight(file: &PathBuf, show_cursors: bool) -> Result<()> {
    let mut parser = CparseParser::new();
    let stdout = Rc::new(RefCell::new(std::io::stdout()));
    let out = Rc::clone(&stdout);
    parser
        .subscribe_pp_token(Box::new(move |event: &Event| {
            if let Some(text) = token_text(event) {
                let mut stdout = out.borrow_mut();
                if show_cursors {
                    write!(stdout, "{}\t", event.cursor()).ok();
                }
                write!(stdout, "{}{}\x1b[0m", token_color(event), text).ok();
            }
            Ok(())
        }))?;
    parser
        .push_input_stream(file.display().to_string(), Box::new(open_stream(file)?))?;
    parser.run()?;
    println!();
    Ok(())
}

fn import_enum(file: &PathBuf) -> Result<()> {
    let mut parser = CparseParser::new();
    let names = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&names);
    parser
        .subscribe_pp_token(Box::new(move |event: &Event| {
            if let Event::Identifier { name, .. } = event {
                sink.borrow_mut().push(name.clone());
            }
            Ok(())
        }))?;
    parser
        .push_input_stream(file.display().to_string(), Box::new(open_stream(file)?))?;
    parser.run()?;

    let mut seen = names.borrow().clone();
    seen.sort();
    seen.dedup();
    for name in seen {
        println!("{name}");
    }
    Ok(())
}
