//! [`TypeText`] command — types a string one character at a time.
//!
//! Script syntax: `type "text here"` or `type "text here" 40ms`

use crate::command::{Command, Context, Flow};
use crate::parser::{parse_speed_suffix, split_quoted};
use anyhow::Result;

/// Inserts each character of the text at the cursor, one step per character.
///
/// The cursor ends up just past the last inserted character, so typing into
/// the middle of existing text pushes the rest to the right.
pub struct TypeText;

impl TypeText {
    pub const NAME: &'static str = "type";

    /// Parse `"text" [speed]`.
    pub fn parse(args: &str) -> Result<Command> {
        let (text, remainder) = split_quoted(args)?;
        Ok(Command::type_text(text).with_options(parse_speed_suffix(remainder)?))
    }

    pub(crate) async fn execute(ctx: &Context, text: &str) -> Flow {
        for ch in text.chars() {
            if ctx.step(|buffer| buffer.insert(ch)).await.is_reset() {
                return Flow::Reset;
            }
        }
        Flow::Continue
    }
}
