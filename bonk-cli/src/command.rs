/// Commands shown by /help (command, description).
pub const COMMANDS: &[(&str, &str)] = &[
    ("/clear", "Reset conversation and workspace"),
    ("/code", "Print the current workspace code"),
    ("/meme <prompt>", "Generate an image in the current style"),
    ("/style [name]", "Show or switch the meme style"),
    ("/help", "Show commands"),
    ("/exit", "Quit"),
];

/// Slash commands recognized by the prompt loop.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Reset conversation to the greeting
    Clear,
    /// Print the workspace code
    Code,
    /// Generate an image
    Meme(String),
    /// Show (None) or set the meme style
    Style(Option<String>),
    Help,
    Exit,
    /// Started with `/` but matched nothing
    Unknown(String),
}

/// Try to parse a slash command from user input.
/// Returns `None` if the input is a chat message.
pub fn parse(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix('/')?;
    let (cmd, arg) = match rest.split_once(char::is_whitespace) {
        Some((c, a)) => (c, Some(a.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    let command = match cmd {
        "clear" | "new" | "reset" => Command::Clear,
        "code" => Command::Code,
        "meme" | "image" => match arg {
            Some(prompt) => Command::Meme(prompt.to_string()),
            None => Command::Unknown("/meme needs a prompt".into()),
        },
        "style" => Command::Style(arg.map(str::to_string)),
        "help" | "?" => Command::Help,
        "exit" | "quit" => Command::Exit,
        other => Command::Unknown(format!("Unknown command: /{other}")),
    };
    Some(command)
}

/// Build the text shown by /help.
pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
    let mut lines = vec!["Commands:".to_string()];
    lines.extend(
        COMMANDS
            .iter()
            .map(|(cmd, desc)| format!("  {cmd:<width$}  {desc}")),
    );
    lines.join("\n")
}
