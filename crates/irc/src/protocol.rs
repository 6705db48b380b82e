//! Outbound protocol commands and the constants of the line format.

use std::fmt;

/// Maximum line length including the trailing CRLF (RFC 2812 §2.3).
pub const MAX_LINE_BYTES: usize = 512;

/// Line terminator appended to every outbound command.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Bytes available for a command once the terminator is accounted for.
pub const MAX_LINE_BODY_BYTES: usize = MAX_LINE_BYTES - LINE_TERMINATOR.len();

/// Longest inbound line accepted, terminator included. Servers with IRCv3
/// message tags send lines well past 512 bytes, so this is generous.
pub const MAX_INBOUND_LINE_BYTES: usize = 64 * 1024;

/// A client command, rendered without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pass(String),
    Nick(String),
    User { user: String, realname: String },
    Pong(String),
    Join(String),
    Privmsg { target: String, text: String },
}

impl Command {
    /// Bytes used by `PRIVMSG <target> :` before any text.
    #[must_use]
    pub fn privmsg_overhead(target: &str) -> usize {
        "PRIVMSG ".len() + target.len() + " :".len()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(password) => write!(f, "PASS {password}"),
            Self::Nick(nick) => write!(f, "NICK {nick}"),
            Self::User { user, realname } => write!(f, "USER {user} 0 * :{realname}"),
            Self::Pong(payload) => write!(f, "PONG {payload}"),
            Self::Join(channel) => write!(f, "JOIN {channel}"),
            Self::Privmsg { target, text } => write!(f, "PRIVMSG {target} :{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(Command::Pass("hunter2".into()), "PASS hunter2")]
    #[case(Command::Nick("smolbot".into()), "NICK smolbot")]
    #[case(
        Command::User { user: "smolbot".into(), realname: "Just a smol bean".into() },
        "USER smolbot 0 * :Just a smol bean"
    )]
    #[case(Command::Pong(":irc.example.net".into()), "PONG :irc.example.net")]
    #[case(Command::Join("#bots".into()), "JOIN #bots")]
    #[case(
        Command::Privmsg { target: "#bots".into(), text: "Status OK".into() },
        "PRIVMSG #bots :Status OK"
    )]
    fn renders_wire_format(#[case] command: Command, #[case] expected: &str) {
        assert_eq!(command.to_string(), expected);
    }

    #[test]
    fn overhead_matches_rendered_prefix() {
        let rendered = Command::Privmsg {
            target: "#bots".into(),
            text: String::new(),
        }
        .to_string();
        assert_eq!(Command::privmsg_overhead("#bots"), rendered.len());
    }

    #[test]
    fn body_budget_leaves_room_for_crlf() {
        assert_eq!(MAX_LINE_BODY_BYTES, 510);
    }
}
