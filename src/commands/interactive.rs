//! Interactive user prompting components

use std::io::{self, Write};

use crate::error::Result;

/// Prompt for yes/no confirmation; only `y` or `yes` confirms.
///
/// `prompt` is printed as given, followed by ` [y/N] `.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    let answer = input.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Check if stdin is a TTY (interactive)
pub fn is_stdin_tty() -> bool {
    atty::is(atty::Stream::Stdin)
}
