#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    New,
    Close,
    Reset,
    /// Zero-based tab index, or `None` when the argument is missing or invalid.
    Tab(Option<usize>),
    Quit,
}

/// Recognizes the known command names only. Anything else, including code
/// that happens to start with `/` such as a regex literal or a `//` comment,
/// is left for the evaluator.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let mut parts = input.split_whitespace();
    let command = parts.next()?;

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/new" => SlashCommand::New,
        "/close" => SlashCommand::Close,
        "/reset" => SlashCommand::Reset,
        "/tab" => SlashCommand::Tab(
            parts
                .next()
                .and_then(|value| value.parse::<usize>().ok())
                .and_then(|number| number.checked_sub(1)),
        ),
        "/quit" => SlashCommand::Quit,
        _ => return None,
    };

    Some(parsed)
}
