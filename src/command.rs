//! [`Command`] — one queued instruction — and the execution context its handler runs in.

use crate::buffer::TextBuffer;
use crate::delay::delay_callback;
use crate::engine::Shared;
use crate::options::{Callback, CallbacksOverride, Config, OptionsOverride};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// What a command does, together with its argument.
///
/// Counts may be negative or larger than the text; they are normalized when
/// the command runs, never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Insert each character at the cursor.
    Type(String),
    /// Delete characters before the cursor.
    Backspace(i64),
    ArrowLeft(i64),
    ArrowRight(i64),
    /// Pause without touching the text.
    Wait(Duration),
}

impl CommandKind {
    /// The script keyword for this kind of command.
    pub fn name(&self) -> &'static str {
        use crate::commands::{ArrowLeft, ArrowRight, Backspace, TypeText, Wait};
        match self {
            Self::Type(_) => TypeText::NAME,
            Self::Backspace(_) => Backspace::NAME,
            Self::ArrowLeft(_) => ArrowLeft::NAME,
            Self::ArrowRight(_) => ArrowRight::NAME,
            Self::Wait(_) => Wait::NAME,
        }
    }
}

/// A command plus the option and callback overrides that take effect when it
/// starts. Overrides stay in effect for later commands until replaced.
#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    pub options: OptionsOverride,
    pub callbacks: CallbacksOverride,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            options: OptionsOverride::default(),
            callbacks: CallbacksOverride::default(),
        }
    }

    pub fn type_text(text: impl Into<String>) -> Self {
        Self::new(CommandKind::Type(text.into()))
    }

    pub fn backspace(count: i64) -> Self {
        Self::new(CommandKind::Backspace(count))
    }

    pub fn arrow_left(count: i64) -> Self {
        Self::new(CommandKind::ArrowLeft(count))
    }

    pub fn arrow_right(count: i64) -> Self {
        Self::new(CommandKind::ArrowRight(count))
    }

    pub fn wait(duration: Duration) -> Self {
        Self::new(CommandKind::Wait(duration))
    }

    pub fn with_options(mut self, options: OptionsOverride) -> Self {
        self.options = options;
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbacksOverride) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Shorthand for overriding only the step speed.
    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.options.speed = Some(speed);
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<CommandKind> for Command {
    fn from(kind: CommandKind) -> Self {
        Self::new(kind)
    }
}

/// Whether the drain loop may carry on after a checkpoint.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// A reset was signalled; unwind without touching the buffer again.
    Reset,
}

impl Flow {
    pub(crate) fn is_reset(self) -> bool {
        self == Self::Reset
    }
}

/// Execution context handed to the command handlers.
///
/// Holds the engine's shared state and the configuration in effect for the
/// running command.
pub(crate) struct Context {
    shared: Arc<Shared>,
    config: Config,
}

impl Context {
    pub(crate) fn new(shared: Arc<Shared>, config: Config) -> Self {
        Self { shared, config }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Layer `command`'s overrides over the current configuration.
    pub(crate) fn apply_overrides(&mut self, command: &Command) {
        self.config = self.config.merged(&command.options, &command.callbacks);
    }

    pub(crate) fn normalize_count(&self, count: i64) -> usize {
        self.shared.read(|buffer| buffer.normalize_count(count))
    }

    pub(crate) fn notify(&self, callback: &Callback) {
        let (output, cursor) = self.shared.read(|buffer| (buffer.output().to_string(), buffer.cursor()));
        callback(&output, cursor);
    }

    /// Block while paused, then report whether a reset is pending.
    pub(crate) async fn checkpoint(&self) -> Flow {
        self.shared.wait_while_paused().await;
        if self.shared.reset_pending() {
            Flow::Reset
        } else {
            Flow::Continue
        }
    }

    /// Suspend for `delay`. The reset flag is read as soon as the delay ends,
    /// and again after any pause that began meanwhile.
    pub(crate) async fn suspend(&self, delay: Duration) -> Flow {
        let shared = &self.shared;
        let interrupted = delay_callback(shared.clock(), delay, || shared.reset_pending()).await;
        if interrupted {
            return Flow::Reset;
        }
        self.checkpoint().await
    }

    /// One animation step: wait one step delay, apply `edit`, report `on_change`.
    pub(crate) async fn step<F>(&self, edit: F) -> Flow
    where
        F: FnOnce(&mut TextBuffer),
    {
        if self.checkpoint().await.is_reset() {
            return Flow::Reset;
        }
        if self.suspend(self.config.options.step_delay()).await.is_reset() {
            return Flow::Reset;
        }
        let (output, cursor) = self.shared.edit(edit);
        trace!(cursor, len = output.len(), "step applied");
        (self.config.callbacks.on_change)(&output, cursor);
        Flow::Continue
    }
}
