//! The administrative command set and its reply texts.

/// Literal text the stop handler writes into its reply edit. Observing this
/// exact text on a later self-originated event performs the actual stop, so
/// the announcement always lands before the shutdown.
pub const STOP_SENTINEL: &str = "Robot is stopping ...";

pub(crate) const STARTUP_NOTICE: &str = "Robot just started.";
pub(crate) const STATUS_REPLY: &str = "The robot is online!";
pub(crate) const RESTART_REPLY: &str = "Restarting the robot ...";
pub(crate) const LOGOUT_REPLY: &str = "The robot is logging out. ...";

const COMMAND_PREFIX: &str = "robot ";

/// Closed set of keywords accepted after the `robot ` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Uptime,
    Memory,
    Restart,
    Logout,
    Stop,
}

/// Control signals a handled event can raise; distinct from failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    Restart,
    Logout,
    Stop,
}

impl Command {
    /// Parses a bare keyword; unknown keywords map to `None`.
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "help" => Some(Self::Help),
            "status" => Some(Self::Status),
            "uptime" => Some(Self::Uptime),
            "memory" => Some(Self::Memory),
            "restart" => Some(Self::Restart),
            "logout" => Some(Self::Logout),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Extracts a command from full message text. Only text whose lower-cased
/// form starts with the `robot ` prefix is eligible.
pub(crate) fn parse_command_text(text: &str) -> Option<Command> {
    let lowered = text.to_lowercase();
    let keyword = lowered.strip_prefix(COMMAND_PREFIX)?;
    Command::parse(keyword)
}

pub(crate) fn help_text() -> String {
    [
        "<b>Robot Instructions:</b>",
        "",
        ">> <b>robot help</b>",
        "   To print the robot commands' help.",
        ">> <b>robot status</b>",
        "   To query the status of the robot.",
        ">> <b>robot uptime</b>",
        "   To query the robot's uptime.",
        ">> <b>robot memory</b>",
        "   To query the robot's memory usage.",
        ">> <b>robot restart</b>",
        "   To restart the robot.",
        ">> <b>robot stop</b>",
        "   To stop the script.",
        ">> <b>robot logout</b>",
        "   To terminate the robot's session.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{help_text, parse_command_text, Command};

    #[test]
    fn unit_parse_command_text_requires_prefix() {
        assert_eq!(parse_command_text("robot status"), Some(Command::Status));
        assert_eq!(parse_command_text("status"), None);
        assert_eq!(parse_command_text("robot"), None);
        assert_eq!(parse_command_text("say robot status"), None);
    }

    #[test]
    fn unit_parse_command_text_is_case_insensitive() {
        assert_eq!(parse_command_text("Robot STATUS"), Some(Command::Status));
        assert_eq!(parse_command_text("ROBOT uptime"), Some(Command::Uptime));
        assert_eq!(parse_command_text("robot Memory"), Some(Command::Memory));
    }

    #[test]
    fn unit_parse_command_text_trims_keyword_whitespace() {
        assert_eq!(parse_command_text("robot  restart"), Some(Command::Restart));
    }

    #[test]
    fn unit_parse_command_text_rejects_unknown_keywords() {
        assert_eq!(parse_command_text("robot dance"), None);
        assert_eq!(parse_command_text("robot statuses"), None);
        assert_eq!(parse_command_text("robot "), None);
    }

    #[test]
    fn unit_help_text_lists_every_command() {
        let help = help_text();
        for keyword in [
            "robot help",
            "robot status",
            "robot uptime",
            "robot memory",
            "robot restart",
            "robot stop",
            "robot logout",
        ] {
            assert!(help.contains(keyword), "help text should mention {keyword}");
        }
    }
}
