//! # Typist
//!
//! A typewriter animation engine.
//!
//! Typist builds up a string one character at a time the way a person types
//! it: characters appear at a steady pace, mistakes get backspaced, and the
//! cursor moves around with arrow keys. You queue commands, the engine plays
//! them in order on a Tokio task, and callbacks report every intermediate
//! state so a UI can draw it.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::time::Duration;
//! use typist::{CallbacksOverride, OptionsOverride, Typer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let typer = Typer::builder()
//!         .options(OptionsOverride::new().speed(Duration::from_millis(60)))
//!         .callbacks(CallbacksOverride::new().on_change(|output, cursor| {
//!             println!("{output} (cursor at {cursor})");
//!         }))
//!         .build();
//!
//!     typer
//!         .type_text("Hello, wrold")
//!         .backspace(4)
//!         .type_text("orld!");
//!     typer.idle().await;
//!
//!     assert_eq!(typer.output(), "Hello, world!");
//! }
//! ```
//!
//! ## Commands
//!
//! | Method | Script | Effect |
//! |--------|--------|--------|
//! | [`Typer::type_text`] | `type "text"` | Insert each character at the cursor |
//! | [`Typer::backspace`] | `backspace 3` | Delete characters before the cursor |
//! | [`Typer::arrow_left`] | `left 2` | Move the cursor left |
//! | [`Typer::arrow_right`] | `right 2` | Move the cursor right |
//! | [`Typer::wait`] | `wait 500ms` | Hold for a duration |
//!
//! Counts are never rejected. Backspace and arrow counts wrap modulo
//! `len + 1` (so `backspace -1` clears the whole text), and a single arrow
//! step never moves past either end.
//!
//! ## Options and callbacks
//!
//! Configuration layers: built-in defaults (100 ms per step), then the
//! instance globals, then each command's overrides. Overrides attached to a
//! [`Command`] stay in effect for later commands until replaced:
//!
//! ```no_run
//! use std::time::Duration;
//! use typist::{Command, Typer};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let typer = Typer::new();
//! typer
//!     .play(Command::type_text("fast").with_speed(Duration::from_millis(20)))
//!     .type_text(" and still fast");
//! typer.idle().await;
//! # }
//! ```
//!
//! ## Lifecycle
//!
//! [`Typer::pause`] holds the engine at its next checkpoint, [`Typer::start`]
//! resumes it, and [`Typer::reset`] clears the queue, the text and the cursor.
//! A reset issued mid-run takes effect after the step in flight.
//!
//! ## Scripts
//!
//! [`parse_str`] and [`parse_file`] turn a small line-based script into
//! commands:
//!
//! ```
//! use typist::parse_str;
//!
//! let commands = parse_str(r#"
//! type "helo" 80ms   # per-command speed
//! left 1
//! type "l"
//! wait 1s
//! "#).unwrap();
//! assert_eq!(commands.len(), 4);
//! ```

pub mod buffer;
pub mod command;
pub mod commands;
pub mod delay;
pub mod engine;
pub mod options;
pub mod parser;
pub mod queue;

pub use buffer::TextBuffer;
pub use command::{Command, CommandKind};
pub use delay::{Clock, TokioClock, delay_callback};
pub use engine::{Phase, Typer, TyperBuilder};
pub use options::{Callbacks, CallbacksOverride, Config, Options, OptionsOverride};
pub use parser::{parse_file, parse_str};
pub use queue::{CommandQueue, QueueError};
