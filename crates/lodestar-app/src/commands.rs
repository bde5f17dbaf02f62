//! Command parsing for submitted input.
//!
//! Input starting with `/` is a command. Anything else is an entry.

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the server status.
    Status,

    /// Measure round-trip time to the server.
    Ping,

    /// Clear recorded entries.
    Clear,

    /// Quit the application.
    Quit,

    /// Plain text entry.
    Entry {
        /// Entry text.
        text: String,
    },

    /// Unknown command.
    Unknown {
        /// The original input.
        input: String,
    },
}

/// Parse a submitted input line.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    let Some(cmd) = input.strip_prefix('/') else {
        return Command::Entry { text: input.to_string() };
    };

    match cmd.split_whitespace().next().unwrap_or("") {
        "status" => Command::Status,
        "ping" => Command::Ping,
        "clear" => Command::Clear,
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown { input: input.to_string() },
    }
}
