//! macOS wallpaper setting via osascript
//!
//! System Events exposes the desktop picture to AppleScript; setting it on
//! "every desktop" covers multi-display setups.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use super::stderr_message;

pub async fn set_desktop_background(path: &Path) -> Result<()> {
    let script = format!(
        "tell application \"System Events\" to set picture of every desktop to \"{}\"",
        path.display()
    );

    let output = Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output()
        .await
        .context("Failed to run osascript")?;

    if !output.status.success() {
        anyhow::bail!("osascript failed: {}", stderr_message(&output));
    }

    debug!("Wallpaper set via System Events");
    Ok(())
}
