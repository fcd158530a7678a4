//! [`ArrowLeft`] and [`ArrowRight`] commands — move the cursor.
//!
//! Script syntax: `left 2`, `right 1 30ms`

use crate::buffer::TextBuffer;
use crate::command::{Command, Context, Flow};
use crate::parser::parse_count_args;
use anyhow::Result;

/// Moves the cursor one character left per step, stopping at the start.
pub struct ArrowLeft;

/// Moves the cursor one character right per step, stopping at the end.
pub struct ArrowRight;

impl ArrowLeft {
    pub const NAME: &'static str = "left";

    pub fn parse(args: &str) -> Result<Command> {
        let (count, options) = parse_count_args(args)?;
        Ok(Command::arrow_left(count).with_options(options))
    }

    pub(crate) async fn execute(ctx: &Context, count: i64) -> Flow {
        move_cursor(ctx, count, TextBuffer::move_left).await
    }
}

impl ArrowRight {
    pub const NAME: &'static str = "right";

    pub fn parse(args: &str) -> Result<Command> {
        let (count, options) = parse_count_args(args)?;
        Ok(Command::arrow_right(count).with_options(options))
    }

    pub(crate) async fn execute(ctx: &Context, count: i64) -> Flow {
        move_cursor(ctx, count, TextBuffer::move_right).await
    }
}

// The step count wraps like backspace; each individual move clamps.
async fn move_cursor(ctx: &Context, count: i64, movement: fn(&mut TextBuffer)) -> Flow {
    for _ in 0..ctx.normalize_count(count) {
        if ctx.step(movement).await.is_reset() {
            return Flow::Reset;
        }
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;

    #[test]
    fn test_parse_left() {
        assert_eq!(ArrowLeft::parse("2").unwrap().kind, CommandKind::ArrowLeft(2));
    }

    #[test]
    fn test_parse_right() {
        assert_eq!(
            ArrowRight::parse(" 4 ").unwrap().kind,
            CommandKind::ArrowRight(4)
        );
    }

    #[test]
    fn test_parse_bad_speed() {
        assert!(ArrowRight::parse("1 fast").is_err());
    }
}
