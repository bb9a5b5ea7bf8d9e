//! Request-line parsing
//!
//! One newline-terminated request per connection; replies come back as one
//! or more newline-terminated text lines.

/// A parsed request line.
///
/// Argument-bearing variants carry the raw remainder of the line, so
/// integer parsing and its error vocabulary stay with the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Version,
    List,
    Find(Option<String>),
    Add(Option<String>),
    Copy(Option<String>),
    Del(Option<String>),
    Clear,
    Up(Option<String>),
    Down(Option<String>),
    Top(Option<String>),
    Quit,
    /// Anything unrecognized, including the empty line. Carries the
    /// upper-cased command token for logging.
    Unknown(String),
}

impl Command {
    /// Stable command name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Version => "VERSION",
            Command::List => "LIST",
            Command::Find(_) => "FIND",
            Command::Add(_) => "ADD",
            Command::Copy(_) => "COPY",
            Command::Del(_) => "DEL",
            Command::Clear => "CLEAR",
            Command::Up(_) => "UP",
            Command::Down(_) => "DOWN",
            Command::Top(_) => "TOP",
            Command::Quit => "QUIT",
            Command::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Parse one request line into a [`Command`].
///
/// The line is trimmed of surrounding whitespace and split at the first
/// space: the left token (upper-cased) names the command, the remainder is
/// the argument, passed through byte-for-byte so multi-word payloads
/// survive intact. A line without a space is a bare command.
pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    let (token, argument) = match trimmed.split_once(' ') {
        Some((token, rest)) => (token, Some(rest.to_string())),
        None if trimmed.is_empty() => return Command::Unknown(String::new()),
        None => (trimmed, None),
    };
    match token.to_ascii_uppercase().as_str() {
        "PING" => Command::Ping,
        "VERSION" => Command::Version,
        "LIST" => Command::List,
        "FIND" => Command::Find(argument),
        "ADD" => Command::Add(argument),
        "COPY" => Command::Copy(argument),
        "DEL" => Command::Del(argument),
        "CLEAR" => Command::Clear,
        "UP" => Command::Up(argument),
        "DOWN" => Command::Down(argument),
        "TOP" => Command::Top(argument),
        "QUIT" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_line("PING"), Command::Ping);
        assert_eq!(parse_line("list"), Command::List);
        assert_eq!(parse_line("Quit"), Command::Quit);
        assert_eq!(parse_line("CLEAR"), Command::Clear);
    }

    #[test]
    fn splits_argument_at_first_space() {
        assert_eq!(
            parse_line("ADD hello world"),
            Command::Add(Some("hello world".into()))
        );
        assert_eq!(parse_line("COPY 3"), Command::Copy(Some("3".into())));
        assert_eq!(parse_line("FIND a b c"), Command::Find(Some("a b c".into())));
    }

    #[test]
    fn argument_passes_through_unmodified() {
        assert_eq!(parse_line("ADD  spaced"), Command::Add(Some(" spaced".into())));
        assert_eq!(
            parse_line("FIND MiXeD Case"),
            Command::Find(Some("MiXeD Case".into()))
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(parse_line("  LIST  \n"), Command::List);
        assert_eq!(parse_line("ADD hi \n"), Command::Add(Some("hi".into())));
    }

    #[test]
    fn missing_argument_is_none() {
        assert_eq!(parse_line("ADD"), Command::Add(None));
        assert_eq!(parse_line("COPY "), Command::Copy(None));
    }

    #[test]
    fn empty_and_unrecognized_lines_are_unknown() {
        assert_eq!(parse_line(""), Command::Unknown(String::new()));
        assert_eq!(parse_line("   \n"), Command::Unknown(String::new()));
        assert_eq!(parse_line("NOPE stuff"), Command::Unknown("NOPE".into()));
    }
}
