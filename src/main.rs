use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::Level;
use typist::parser::parse_duration;
use typist::{CallbacksOverride, OptionsOverride, Typer, parse_file};

#[derive(Parser, Debug)]
#[command(
    name = "typist",
    about = "Play a typist script and print the text it produces",
    version
)]
struct Args {
    /// Path to the script file
    #[arg(short, long)]
    script: String,

    /// Delay per character, e.g. `80ms` (default 100ms)
    #[arg(long, value_parser = parse_duration_arg)]
    speed: Option<Duration>,

    /// Random extra delay per character, up to this much
    #[arg(long, value_parser = parse_duration_arg)]
    jitter: Option<Duration>,

    /// Print every intermediate frame with `|` marking the cursor
    #[arg(short, long)]
    trace: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| format!("{e:#}"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

// One frame of the animation, with `|` at the cursor.
fn frame(output: &str, cursor: usize) -> String {
    let at = output
        .char_indices()
        .nth(cursor)
        .map_or(output.len(), |(i, _)| i);
    format!("{}|{}", &output[..at], &output[at..])
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let commands = parse_file(&args.script)
        .with_context(|| format!("Failed to parse script file: {}", args.script))?;

    let options = OptionsOverride {
        speed: args.speed,
        jitter: args.jitter,
    };

    let mut callbacks = CallbacksOverride::new();
    if args.trace {
        callbacks = callbacks.on_change(|output, cursor| println!("{}", frame(output, cursor)));
    }

    let typer = Typer::builder()
        .options(options)
        .callbacks(callbacks)
        .commands(commands)
        .build();
    typer.start();
    typer.idle().await;

    println!("{}", typer.output());
    Ok(())
}
