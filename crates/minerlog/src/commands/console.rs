//! Operator commands typed into a running `tail` session.

use std::fmt;

pub const HELP: &str = "commands: start | stop | restart | pause | resume | \
    filter <text> | filter | show | export | status | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    Restart,
    Pause,
    Resume,
    /// Empty text clears the filter.
    Filter(String),
    Show,
    Export,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command '{}' ({HELP})", self.0)
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, UnknownCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "start" => ConsoleCommand::Start,
        "stop" => ConsoleCommand::Stop,
        "restart" => ConsoleCommand::Restart,
        "pause" => ConsoleCommand::Pause,
        "resume" => ConsoleCommand::Resume,
        "filter" | "f" => ConsoleCommand::Filter(rest.to_owned()),
        "show" | "ls" => ConsoleCommand::Show,
        "export" | "save" => ConsoleCommand::Export,
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        _ => return Err(UnknownCommand(word.to_owned())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse("start"), Ok(Some(ConsoleCommand::Start)));
        assert_eq!(parse("  PAUSE \n"), Ok(Some(ConsoleCommand::Pause)));
        assert_eq!(parse("q"), Ok(Some(ConsoleCommand::Quit)));
    }

    #[test]
    fn filter_keeps_the_rest_of_the_line() {
        assert_eq!(
            parse("filter  hash rate low "),
            Ok(Some(ConsoleCommand::Filter("hash rate low".into())))
        );
        assert_eq!(parse("filter"), Ok(Some(ConsoleCommand::Filter(String::new()))));
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn unknown_words_are_reported() {
        let err = parse("reboot now").unwrap_err();
        assert_eq!(err, UnknownCommand("reboot".into()));
        assert!(err.to_string().contains("commands:"));
    }
}
