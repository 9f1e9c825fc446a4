//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Wallet commands
    Connect,
    Switch,

    // Registry commands
    Mint { name: String, record: String },
    Set { name: String, record: String },
    Edit(String),
    Cancel,
    Refresh,

    Quit,
    Help,

    // Unknown command
    Unknown(String),
}

/// Split `args` into the first word and the remainder of the line
fn name_and_rest(args: Option<&str>) -> Option<(String, String)> {
    let args = args?.trim();
    if args.is_empty() {
        return None;
    }
    let mut parts = args.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").to_string();
    let rest = parts.next().map(|s| s.trim().to_string()).unwrap_or_default();
    Some((name, rest))
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next();

    match cmd.to_lowercase().as_str() {
        "connect" | "conn" => Command::Connect,
        "switch" | "sw" => Command::Switch,

        // The record may contain spaces; everything after the name belongs to it
        "mint" | "register" | "reg" => match name_and_rest(args) {
            Some((name, record)) => Command::Mint { name, record },
            None => Command::Unknown(input.to_string()),
        },
        "set" | "record" => match name_and_rest(args) {
            Some((name, record)) if !record.is_empty() => Command::Set { name, record },
            _ => Command::Unknown(input.to_string()),
        },
        "edit" => match name_and_rest(args) {
            Some((name, _)) => Command::Edit(name),
            None => Command::Unknown(input.to_string()),
        },
        "cancel" => Command::Cancel,
        "refresh" | "r" => Command::Refresh,

        "quit" | "q" | "exit" => Command::Quit,
        "help" | "h" | "?" => Command::Help,

        _ => Command::Unknown(input.to_string()),
    }
}
