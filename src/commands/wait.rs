//! [`Wait`] command — pauses for a fixed duration.
//!
//! Script syntax: `wait 500ms` or `wait 1.5s`

use crate::command::{Command, Context, Flow};
use crate::parser::parse_duration;
use anyhow::Result;
use std::time::Duration;

/// Holds the animation for a fixed duration without touching the text.
pub struct Wait;

impl Wait {
    pub const NAME: &'static str = "wait";

    pub fn parse(args: &str) -> Result<Command> {
        Ok(Command::wait(parse_duration(args)?))
    }

    pub(crate) async fn execute(ctx: &Context, duration: Duration) -> Flow {
        ctx.suspend(duration).await
    }
}
