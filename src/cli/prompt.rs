use std::io::IsTerminal;

use anyhow::{bail, Result};
use dialoguer::Confirm;

/// Asks a yes/no question before a destructive command. Defaults to no. Without a terminal there
/// is nobody to ask, so the command has to be confirmed with `--yes`.
pub fn confirm(question: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!("{question} Not running in a terminal, pass --yes to confirm");
    }

    Ok(Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()?)
}
