//! Timing options, lifecycle callbacks, and how they layer.
//!
//! A [`Config`] is always fully resolved. It starts from the built-in defaults,
//! takes the instance globals, and then every command's overrides in turn.
//! Merging never mutates: [`Config::merged`] returns a new value.

use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Delay per step when nothing overrides it.
pub const DEFAULT_SPEED: Duration = Duration::from_millis(100);

/// Receives the output and the cursor position.
pub type Callback = Arc<dyn Fn(&str, usize) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Delay before each character-level step.
    pub speed: Duration,
    /// Upper bound of a random extra delay added to every step.
    pub jitter: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            jitter: Duration::ZERO,
        }
    }
}

impl Options {
    pub fn merged(self, overrides: &OptionsOverride) -> Self {
        Self {
            speed: overrides.speed.unwrap_or(self.speed),
            jitter: overrides.jitter.unwrap_or(self.jitter),
        }
    }

    /// The delay for one step: `speed` plus a random share of `jitter`.
    pub fn step_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.speed;
        }
        let extra_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis());
        self.speed
            .saturating_add(Duration::from_millis(u64::try_from(extra_ms).unwrap_or(u64::MAX)))
    }
}

/// Partial [`Options`]. Unset fields keep whatever value was in effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionsOverride {
    pub speed: Option<Duration>,
    pub jitter: Option<Duration>,
}

impl OptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed(mut self, speed: Duration) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn jitter(mut self, jitter: Duration) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_none() && self.jitter.is_none()
    }
}

/// The three lifecycle notifications.
///
/// `on_before_change` fires once before a command runs, `on_change` after every
/// step that command takes, and `on_after_change` once when it is done. They are
/// plain synchronous calls and cannot hold up the engine.
#[derive(Clone)]
pub struct Callbacks {
    pub on_change: Callback,
    pub on_before_change: Callback,
    pub on_after_change: Callback,
}

impl Default for Callbacks {
    fn default() -> Self {
        let noop: Callback = Arc::new(|_: &str, _: usize| {});
        Self {
            on_change: noop.clone(),
            on_before_change: noop.clone(),
            on_after_change: noop,
        }
    }
}

impl Callbacks {
    pub fn merged(&self, overrides: &CallbacksOverride) -> Self {
        let pick = |over: &Option<Callback>, current: &Callback| {
            over.clone().unwrap_or_else(|| current.clone())
        };
        Self {
            on_change: pick(&overrides.on_change, &self.on_change),
            on_before_change: pick(&overrides.on_before_change, &self.on_before_change),
            on_after_change: pick(&overrides.on_after_change, &self.on_after_change),
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

/// Partial [`Callbacks`].
#[derive(Clone, Default)]
pub struct CallbacksOverride {
    pub on_change: Option<Callback>,
    pub on_before_change: Option<Callback>,
    pub on_after_change: Option<Callback>,
}

impl CallbacksOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(mut self, f: impl Fn(&str, usize) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(f));
        self
    }

    pub fn on_before_change(mut self, f: impl Fn(&str, usize) + Send + Sync + 'static) -> Self {
        self.on_before_change = Some(Arc::new(f));
        self
    }

    pub fn on_after_change(mut self, f: impl Fn(&str, usize) + Send + Sync + 'static) -> Self {
        self.on_after_change = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for CallbacksOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbacksOverride")
            .field("on_change", &self.on_change.is_some())
            .field("on_before_change", &self.on_before_change.is_some())
            .field("on_after_change", &self.on_after_change.is_some())
            .finish()
    }
}

/// A fully resolved set of options and callbacks.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub options: Options,
    pub callbacks: Callbacks,
}

impl Config {
    /// The defaults with the instance globals layered on top.
    pub fn seeded(options: &OptionsOverride, callbacks: &CallbacksOverride) -> Self {
        Self::default().merged(options, callbacks)
    }

    pub fn merged(&self, options: &OptionsOverride, callbacks: &CallbacksOverride) -> Self {
        Self {
            options: self.options.merged(options),
            callbacks: self.callbacks.merged(callbacks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_default_speed() {
        let config = Config::default();
        assert_eq!(config.options.speed, Duration::from_millis(100));
        assert_eq!(config.options.step_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_override_wins_and_unset_fields_persist() {
        let base = Options::default().merged(&OptionsOverride::new().jitter(Duration::from_millis(5)));
        let merged = base.merged(&OptionsOverride::new().speed(Duration::from_millis(30)));
        assert_eq!(merged.speed, Duration::from_millis(30));
        assert_eq!(merged.jitter, Duration::from_millis(5));

        let again = merged.merged(&OptionsOverride::new());
        assert_eq!(again, merged);
    }

    #[test]
    fn test_step_delay_within_jitter() {
        let options = Options {
            speed: Duration::from_millis(10),
            jitter: Duration::from_millis(20),
        };
        for _ in 0..50 {
            let delay = options.step_delay();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(30));
        }
    }

    #[test]
    fn test_step_delay_saturates() {
        let options = Options {
            speed: Duration::MAX,
            jitter: Duration::from_secs(3600),
        };
        assert_eq!(options.step_delay(), Duration::MAX);
    }

    #[test]
    fn test_callback_merge_keeps_previous() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let first = Config::seeded(
            &OptionsOverride::new(),
            &CallbacksOverride::new().on_change(move |out, pos| {
                sink.lock().unwrap().push((out.to_string(), pos));
            }),
        );
        let second = first.merged(
            &OptionsOverride::new(),
            &CallbacksOverride::new().on_after_change(|_, _| {}),
        );

        (second.callbacks.on_change)("ab", 1);
        assert_eq!(*seen.lock().unwrap(), vec![("ab".to_string(), 1)]);
    }

    #[test]
    fn test_merge_does_not_mutate_original() {
        let base = Config::default();
        let _ = base.merged(
            &OptionsOverride::new().speed(Duration::from_millis(1)),
            &CallbacksOverride::new(),
        );
        assert_eq!(base.options.speed, DEFAULT_SPEED);
    }
}
