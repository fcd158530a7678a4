//! Script parser for typist animation scripts.
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`].

use crate::command::Command;
use crate::commands::{ArrowLeft, ArrowRight, Backspace, TypeText, Wait};
use crate::options::OptionsOverride;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;
use std::time::Duration;

/// Parse a typist script from a string slice and return the resulting commands.
///
/// Lines that are empty or start with `#` are ignored. Inline comments (` # …`)
/// are stripped while preserving `#` characters inside quoted strings.
///
/// # Errors
///
/// Returns an error if any line contains an unknown command, a malformed
/// argument, or an unclosed quoted string.
///
/// # Example
///
/// ```
/// use typist::parse_str;
///
/// let commands = parse_str("type \"hello\"\nwait 500ms\nbackspace 2\n").unwrap();
/// assert_eq!(commands.len(), 3);
/// ```
pub fn parse_str(content: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = strip_inline_comment(line);
        let cmd = parse_line(line)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
        commands.push(cmd);
    }
    Ok(commands)
}

/// Parse a typist script from a file and return the resulting commands.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if the script is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Command>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;
    parse_str(&content)
}

type ParseFn = fn(&str) -> Result<Command>;

static REGISTRY: &[(&str, ParseFn)] = &[
    (TypeText::NAME, TypeText::parse),
    (Backspace::NAME, Backspace::parse),
    (ArrowLeft::NAME, ArrowLeft::parse),
    (ArrowRight::NAME, ArrowRight::parse),
    (Wait::NAME, Wait::parse),
];

/// Dispatch a single non-empty, non-comment line to the matching command's parser.
fn parse_line(line: &str) -> Result<Command> {
    let (name, args) = line.split_once(' ').unwrap_or((line, ""));
    REGISTRY
        .iter()
        .find(|(cmd_name, _)| *cmd_name == name)
        .map(|(_, parse)| parse(args))
        .unwrap_or_else(|| Err(anyhow!("Unknown command: {}", line)))
}

/// Strip inline comments from a line, preserving `#` inside quoted strings.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == '#' && !in_quotes {
            return line[..i].trim();
        }
    }
    line
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
///
/// # Errors
///
/// Returns an error if the unit suffix is missing or the value is not a
/// non-negative number in range.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).context("Seconds value out of range")
    } else {
        Err(anyhow!("Duration must end with 's' or 'ms', got: {}", s))
    }
}

/// Parse a double-quoted string, processing `\n`, `\t`, `\"`, and `\\`.
pub(crate) fn parse_quoted_string(s: &str) -> Result<String> {
    let s = s.trim();
    if !s.starts_with('"') {
        return Err(anyhow!("Expected string to start with '\"'"));
    }
    if s.len() < 2 || !s.ends_with('"') {
        return Err(anyhow!("Expected string to end with '\"'"));
    }
    Ok(unescape(&s[1..s.len() - 1]))
}

/// Resolve backslash escapes left to right. Unknown escapes are kept verbatim.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Split `"quoted text" rest` into the unescaped text and the trimmed rest.
pub(crate) fn split_quoted(args: &str) -> Result<(String, &str)> {
    let args = args.trim();
    if !args.starts_with('"') {
        return Err(anyhow!("Expected quoted string"));
    }

    // Locate the closing quote, respecting backslash escapes.
    let mut escaped = false;
    let mut end_idx = None;
    for (i, ch) in args.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            end_idx = Some(i);
            break;
        }
    }

    let end_idx = end_idx.ok_or_else(|| anyhow!("Unclosed quote"))?;
    let text = parse_quoted_string(&args[..=end_idx])?;
    Ok((text, args[end_idx + 1..].trim()))
}

/// Parse an optional trailing per-command speed such as `40ms`.
pub(crate) fn parse_speed_suffix(s: &str) -> Result<OptionsOverride> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(OptionsOverride::new());
    }
    Ok(OptionsOverride::new().speed(parse_duration(s).context("Invalid speed")?))
}

/// Parse `count [speed]` for the counted commands.
pub(crate) fn parse_count_args(args: &str) -> Result<(i64, OptionsOverride)> {
    let args = args.trim();
    let (count, rest) = args.split_once(' ').unwrap_or((args, ""));
    let count: i64 = count
        .parse()
        .with_context(|| format!("Invalid count: '{count}'"))?;
    Ok((count, parse_speed_suffix(rest)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(
            parse_duration("1.5s").unwrap(),
            Duration::from_secs_f64(1.5)
        );
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_quoted_string() {
        assert_eq!(parse_quoted_string("\"hello\"").unwrap(), "hello");
        assert_eq!(
            parse_quoted_string("\"hello\\nworld\"").unwrap(),
            "hello\nworld"
        );
        assert!(parse_quoted_string("\"").is_err());
    }

    #[test]
    fn test_escaped_backslash_before_letter() {
        let cmds = parse_str(r#"type "a\\nb""#).unwrap();
        assert_eq!(cmds[0].kind, CommandKind::Type(r"a\nb".to_string()));

        assert_eq!(parse_quoted_string(r#""tab\\\there""#).unwrap(), "tab\\\there");
        assert_eq!(parse_quoted_string(r#""keep \q""#).unwrap(), r"keep \q");
    }

    #[test]
    fn test_split_quoted() {
        let (text, rest) = split_quoted(r#""a \"b\" c" 10ms"#).unwrap();
        assert_eq!(text, r#"a "b" c"#);
        assert_eq!(rest, "10ms");
    }

    #[test]
    fn test_parse_all_commands() {
        let cmds =
            parse_str("type \"hi\"\nbackspace 1\nleft 2\nright 3\nwait 500ms\n").unwrap();
        let kinds: Vec<CommandKind> = cmds.into_iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::Type("hi".to_string()),
                CommandKind::Backspace(1),
                CommandKind::ArrowLeft(2),
                CommandKind::ArrowRight(3),
                CommandKind::Wait(Duration::from_millis(500)),
            ]
        );
    }

    #[test]
    fn test_parse_comments_only() {
        assert_eq!(parse_str("# c1\n# c2\n").unwrap().len(), 0);
    }

    #[test]
    fn test_parse_empty_lines() {
        let cmds = parse_str("\n\nwait 1s\n\ntype \"test\"\n\n").unwrap();
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn test_parse_invalid_command() {
        let err = format!("{:#}", parse_str("unknown_command \"test\"").unwrap_err());
        assert!(err.contains("Unknown command"), "got: {err}");
        assert!(err.contains("line 1"), "got: {err}");
    }

    #[test]
    fn test_parse_invalid_duration() {
        assert!(parse_str("wait 5minutes").is_err());
    }

    #[test]
    fn test_parse_unclosed_quote() {
        assert!(parse_str("type \"unclosed").is_err());
    }

    #[test]
    fn test_strip_inline_comments() {
        assert_eq!(strip_inline_comment("wait 1s # comment"), "wait 1s");
        assert_eq!(
            strip_inline_comment("type \"#hashtag\""),
            "type \"#hashtag\""
        );
        assert_eq!(
            strip_inline_comment("type \"test#1\" # comment"),
            "type \"test#1\""
        );
    }

    #[test]
    fn test_parse_with_inline_comments() {
        let cmds = parse_str("wait 1s # delay\ntype \"hi\" 20ms # greet\nleft 1 # move\n").unwrap();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[1].options.speed, Some(Duration::from_millis(20)));
    }
}
