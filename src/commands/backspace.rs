//! [`Backspace`] command — deletes characters before the cursor.
//!
//! Script syntax: `backspace 3` or `backspace -1 20ms`

use crate::command::{Command, Context, Flow};
use crate::parser::parse_count_args;
use anyhow::Result;

/// Deletes the character before the cursor, once per step.
///
/// The count wraps modulo `len + 1`, so `-1` deletes as many characters as the
/// text holds. Steps taken with the cursor already at the start delete nothing.
pub struct Backspace;

impl Backspace {
    pub const NAME: &'static str = "backspace";

    pub fn parse(args: &str) -> Result<Command> {
        let (count, options) = parse_count_args(args)?;
        Ok(Command::backspace(count).with_options(options))
    }

    pub(crate) async fn execute(ctx: &Context, count: i64) -> Flow {
        for _ in 0..ctx.normalize_count(count) {
            if ctx
                .step(|buffer| {
                    buffer.backspace();
                })
                .await
                .is_reset()
            {
                return Flow::Reset;
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use std::time::Duration;

    #[test]
    fn test_parse() {
        let cmd = Backspace::parse("3").unwrap();
        assert_eq!(cmd.kind, CommandKind::Backspace(3));
    }

    #[test]
    fn test_parse_negative_with_speed() {
        let cmd = Backspace::parse("-1 20ms").unwrap();
        assert_eq!(cmd.kind, CommandKind::Backspace(-1));
        assert_eq!(cmd.options.speed, Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Backspace::parse("lots").is_err());
        assert!(Backspace::parse("").is_err());
    }
}
