//! Utility functions for the CLI.

use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use zeroize::Zeroizing;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Read a whole file, or stdin for `None` and `-`.
pub fn read_input(input: Option<&Path>) -> std::io::Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read(path),
        _ => {
            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

/// Read input as text, dropping one trailing newline.
pub fn read_text(input: Option<&Path>) -> Result<String, Box<dyn std::error::Error>> {
    let text = String::from_utf8(read_input(input)?)?;
    Ok(strip_newline(text))
}

fn strip_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// The password from the environment or flag, else an interactive prompt.
///
/// New passwords are prompted twice.
pub fn password(
    given: Option<String>,
    confirm: bool,
) -> Result<Zeroizing<String>, dialoguer::Error> {
    if let Some(password) = given {
        return Ok(Zeroizing::new(password));
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    prompt.interact().map(Zeroizing::new)
}
