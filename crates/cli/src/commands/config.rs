use anyhow::Result;

use crate::state::AppState;

/// Print the effective configuration as JSON.
pub fn show(state: &AppState) -> Result<()> {
    let config = state.sanitized_config()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
