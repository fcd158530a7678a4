use crate::buffer::TextBuffer;
use crate::command::{Command, CommandKind, Context, Flow};
use crate::commands::{ArrowLeft, ArrowRight, Backspace, TypeText, Wait};
use crate::delay::{Clock, TokioClock};
use crate::options::{CallbacksOverride, Config, OptionsOverride};
use crate::queue::CommandQueue;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The engine's control flags. Only the drain loop and the lifecycle methods
/// write them; the loop reads them at its checkpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Control {
    running: bool,
    paused: bool,
    /// Set while running to ask the loop to unwind.
    reset: bool,
}

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

struct Settings {
    global_options: OptionsOverride,
    global_callbacks: CallbacksOverride,
    /// The configuration left behind by the last merged command.
    live: Config,
    /// Globals changed since `live` was seeded.
    reseed: bool,
}

impl Settings {
    fn new(global_options: OptionsOverride, global_callbacks: CallbacksOverride) -> Self {
        let live = Config::seeded(&global_options, &global_callbacks);
        Self {
            global_options,
            global_callbacks,
            live,
            reseed: false,
        }
    }

    /// The configuration a run starting now begins with.
    fn current(&self) -> Config {
        if self.reseed {
            Config::seeded(&self.global_options, &self.global_callbacks)
        } else {
            self.live.clone()
        }
    }

    fn begin_run(&mut self) -> Config {
        if self.reseed {
            self.live = Config::seeded(&self.global_options, &self.global_callbacks);
            self.reseed = false;
        }
        self.live.clone()
    }
}

/// State shared between every [`Typer`] clone and the drain task.
pub(crate) struct Shared {
    buffer: Mutex<TextBuffer>,
    queue: Mutex<CommandQueue<Command>>,
    settings: Mutex<Settings>,
    control: watch::Sender<Control>,
    clock: Arc<dyn Clock>,
}

// A callback that panicked mid-run must not wedge the handle.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn reset_pending(&self) -> bool {
        self.control.borrow().reset
    }

    /// Resolves immediately unless paused; a reset also ends the wait.
    pub(crate) async fn wait_while_paused(&self) {
        let mut rx = self.control.subscribe();
        // The sender outlives every receiver, so this cannot fail.
        let _ = rx.wait_for(|c| !c.paused || c.reset).await;
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&TextBuffer) -> T) -> T {
        f(&*lock(&self.buffer))
    }

    /// Apply one edit and return a snapshot to report with the lock released.
    pub(crate) fn edit(&self, f: impl FnOnce(&mut TextBuffer)) -> (String, usize) {
        let mut buffer = lock(&self.buffer);
        f(&mut *buffer);
        (buffer.output().to_string(), buffer.cursor())
    }

    /// Claim the running flag if there is work and nobody is draining yet.
    fn try_begin(&self) -> bool {
        let queue = lock(&self.queue);
        if queue.is_empty() {
            return false;
        }
        self.control.send_if_modified(|c| {
            if c.running {
                false
            } else {
                c.running = true;
                true
            }
        })
    }

    /// Decide what the loop does next, under the queue lock so that a
    /// concurrent `reset` or enqueue is never missed. Pops only when `take`.
    fn next(&self, take: bool) -> Next {
        let mut queue = lock(&self.queue);
        if self.control.borrow().reset {
            return Next::Reset;
        }
        if queue.is_empty() {
            self.control.send_modify(|c| c.running = false);
            return Next::Drained;
        }
        if !take {
            return Next::Pending;
        }
        queue.pop().ok().map_or(Next::Drained, Next::Ready)
    }

    fn remember(&self, config: &Config) {
        lock(&self.settings).live = config.clone();
    }

    /// Finish a reset: empty everything, report the cleared text, go idle.
    fn unwind(&self, config: &Config) {
        lock(&self.queue).clear();
        lock(&self.buffer).clear();
        info!("typer reset");
        (config.callbacks.on_change)("", 0);
        // Anything the callback enqueued goes too.
        let mut queue = lock(&self.queue);
        queue.clear();
        self.control.send_modify(|c| *c = Control::default());
    }
}

enum Next {
    Ready(Command),
    Pending,
    Drained,
    Reset,
}

/// Returns the engine to idle if the drain task ends without finishing its
/// run, which happens when a user callback panics.
struct RunGuard<'a> {
    shared: &'a Shared,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("typer run aborted, dropping queued commands");
        let mut queue = lock(&self.shared.queue);
        queue.clear();
        self.shared.control.send_modify(|c| *c = Control::default());
    }
}

/// The drain loop. Runs on its own task until the queue is empty or a reset
/// unwinds it.
async fn drain(shared: Arc<Shared>) {
    let mut guard = RunGuard {
        shared: &shared,
        finished: false,
    };
    let config = lock(&shared.settings).begin_run();
    let mut ctx = Context::new(shared.clone(), config);
    debug!("typer run started");

    if run_queue(&shared, &mut ctx).await.is_reset() {
        shared.unwind(ctx.config());
    } else {
        debug!("typer run finished");
    }
    guard.finished = true;
}

async fn run_queue(shared: &Shared, ctx: &mut Context) -> Flow {
    loop {
        match shared.next(false) {
            Next::Drained => return Flow::Continue,
            Next::Reset => return Flow::Reset,
            Next::Ready(_) | Next::Pending => {}
        }
        if ctx.checkpoint().await.is_reset() {
            return Flow::Reset;
        }
        let command = match shared.next(true) {
            Next::Ready(command) => command,
            Next::Reset => return Flow::Reset,
            Next::Drained | Next::Pending => return Flow::Continue,
        };

        ctx.apply_overrides(&command);
        shared.remember(ctx.config());
        debug!(command = command.name(), "dispatching");

        ctx.notify(&ctx.config().callbacks.on_before_change);
        if dispatch(ctx, &command.kind).await.is_reset() {
            return Flow::Reset;
        }
        ctx.notify(&ctx.config().callbacks.on_after_change);
    }
}

async fn dispatch(ctx: &Context, kind: &CommandKind) -> Flow {
    match kind {
        CommandKind::Type(text) => TypeText::execute(ctx, text).await,
        CommandKind::Backspace(count) => Backspace::execute(ctx, *count).await,
        CommandKind::ArrowLeft(count) => ArrowLeft::execute(ctx, *count).await,
        CommandKind::ArrowRight(count) => ArrowRight::execute(ctx, *count).await,
        CommandKind::Wait(duration) => Wait::execute(ctx, *duration).await,
    }
}

/// A handle to one typewriter engine.
///
/// Clones share the same engine, so a clone can pause or reset a run started
/// through another. Every mutating method returns `&Self` for chaining.
///
/// Methods that may start the drain loop (`start`, `type_text`, `backspace`,
/// `arrow_left`, `arrow_right`, `wait`, `play`) spawn a Tokio task and must be
/// called from within a Tokio runtime.
#[derive(Clone)]
pub struct Typer {
    shared: Arc<Shared>,
}

impl Default for Typer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Typer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typer")
            .field("phase", &self.phase())
            .field("output", &self.output())
            .field("cursor", &self.cursor_position())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Typer {
    /// An idle engine with default options and no-op callbacks.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TyperBuilder {
        TyperBuilder::default()
    }

    /// Enqueue a command without starting the engine.
    pub fn add_command(&self, command: impl Into<Command>) -> &Self {
        lock(&self.shared.queue).push(command.into());
        self
    }

    /// Enqueue several commands without starting the engine.
    pub fn add_commands(&self, commands: impl IntoIterator<Item = Command>) -> &Self {
        lock(&self.shared.queue).extend(commands);
        self
    }

    /// Drop every command that has not started yet. A command in flight finishes.
    pub fn clear_commands(&self) -> &Self {
        lock(&self.shared.queue).clear();
        self
    }

    /// Enqueue `command` and start the engine if it is idle.
    pub fn play(&self, command: impl Into<Command>) -> &Self {
        self.add_command(command).start()
    }

    pub fn type_text(&self, text: impl Into<String>) -> &Self {
        self.play(Command::type_text(text))
    }

    pub fn backspace(&self, count: i64) -> &Self {
        self.play(Command::backspace(count))
    }

    pub fn arrow_left(&self, count: i64) -> &Self {
        self.play(Command::arrow_left(count))
    }

    pub fn arrow_right(&self, count: i64) -> &Self {
        self.play(Command::arrow_right(count))
    }

    pub fn wait(&self, duration: Duration) -> &Self {
        self.play(Command::wait(duration))
    }

    /// Replace the instance-level option defaults.
    ///
    /// A run in flight keeps its configuration. The next run that starts from
    /// idle begins from the built-in defaults with these globals on top.
    pub fn set_global_options(&self, options: OptionsOverride) -> &Self {
        let mut settings = lock(&self.shared.settings);
        settings.global_options = options;
        settings.reseed = true;
        self
    }

    /// Replace the instance-level callbacks. Same timing as
    /// [`set_global_options`](Self::set_global_options).
    pub fn set_global_callbacks(&self, callbacks: CallbacksOverride) -> &Self {
        let mut settings = lock(&self.shared.settings);
        settings.global_callbacks = callbacks;
        settings.reseed = true;
        self
    }

    /// Resume after a pause, or begin draining the queue if idle.
    pub fn start(&self) -> &Self {
        self.shared
            .control
            .send_if_modified(|c| std::mem::replace(&mut c.paused, false));
        if self.shared.try_begin() {
            tokio::spawn(drain(self.shared.clone()));
        }
        self
    }

    /// Hold the engine at its next checkpoint. Does nothing while idle.
    pub fn pause(&self) -> &Self {
        let paused = self.shared.control.send_if_modified(|c| {
            if c.running && !c.paused {
                c.paused = true;
                true
            } else {
                false
            }
        });
        if paused {
            debug!("typer paused");
        }
        self
    }

    /// Clear the queue, the text and the cursor.
    ///
    /// While idle this happens immediately and `on_change("", 0)` fires before
    /// returning. While running (or paused) the drain loop is signalled and
    /// unwinds at its next checkpoint; await [`idle`](Self::idle) to observe
    /// the cleared state. Commands enqueued before the loop unwinds are
    /// discarded with the rest.
    pub fn reset(&self) -> &Self {
        let config = {
            let mut queue = lock(&self.shared.queue);
            let signalled = self.shared.control.send_if_modified(|c| {
                if c.running {
                    c.reset = true;
                    true
                } else {
                    false
                }
            });
            if signalled {
                debug!("typer reset requested");
                return self;
            }
            queue.clear();
            lock(&self.shared.buffer).clear();
            lock(&self.shared.settings).current()
        };
        info!("typer reset");
        (config.callbacks.on_change)("", 0);
        self
    }

    pub fn is_running(&self) -> bool {
        self.shared.control.borrow().running
    }

    pub fn is_paused(&self) -> bool {
        self.shared.control.borrow().paused
    }

    pub fn phase(&self) -> Phase {
        let control = *self.shared.control.borrow();
        match (control.running, control.paused) {
            (false, _) => Phase::Idle,
            (true, false) => Phase::Running,
            (true, true) => Phase::Paused,
        }
    }

    /// The text typed so far.
    pub fn output(&self) -> String {
        self.shared.read(|buffer| buffer.output().to_string())
    }

    /// Cursor position in characters, always within `0..=output.chars().count()`.
    pub fn cursor_position(&self) -> usize {
        self.shared.read(TextBuffer::cursor)
    }

    /// Number of commands waiting to start.
    pub fn pending(&self) -> usize {
        lock(&self.shared.queue).len()
    }

    /// Resolve once the engine is not running.
    pub async fn idle(&self) {
        let mut rx = self.shared.control.subscribe();
        let _ = rx.wait_for(|c| !c.running).await;
    }
}

/// Configures a [`Typer`] before it is built.
#[derive(Default)]
pub struct TyperBuilder {
    options: OptionsOverride,
    callbacks: CallbacksOverride,
    commands: Vec<Command>,
    clock: Option<Arc<dyn Clock>>,
}

impl TyperBuilder {
    /// Instance-level option defaults.
    pub fn options(mut self, options: OptionsOverride) -> Self {
        self.options = options;
        self
    }

    /// Instance-level callbacks.
    pub fn callbacks(mut self, callbacks: CallbacksOverride) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Commands queued at construction. They wait for [`Typer::start`].
    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> Typer {
        let mut queue = CommandQueue::new();
        queue.extend(self.commands);
        let (control, _) = watch::channel(Control::default());
        Typer {
            shared: Arc::new(Shared {
                buffer: Mutex::new(TextBuffer::new()),
                queue: Mutex::new(queue),
                settings: Mutex::new(Settings::new(self.options, self.callbacks)),
                control,
                clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
            }),
        }
    }
}
