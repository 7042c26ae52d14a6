//! Linux wallpaper setting via gsettings, with a feh fallback
//!
//! GNOME (and most GTK desktops) honor the org.gnome.desktop.background
//! schema; light and dark variants are tracked under separate keys. Bare
//! X sessions without a desktop environment get feh instead.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, warn};

use super::stderr_message;

pub async fn set_desktop_background(path: &Path) -> Result<()> {
    let uri = format!("file://{}", path.display());

    match gsettings_set(&uri).await {
        Ok(()) => return Ok(()),
        Err(e) => {
            warn!(error = %e, "gsettings unavailable, falling back to feh");
        }
    }

    let output = Command::new("feh")
        .arg("--bg-fill")
        .arg(path)
        .output()
        .await
        .context("Failed to run feh")?;

    if !output.status.success() {
        anyhow::bail!("feh --bg-fill failed: {}", stderr_message(&output));
    }

    debug!("Wallpaper set via feh");
    Ok(())
}

async fn gsettings_set(uri: &str) -> Result<()> {
    for key in ["picture-uri", "picture-uri-dark"] {
        let output = Command::new("gsettings")
            .args(["set", "org.gnome.desktop.background", key, uri])
            .output()
            .await
            .context("Failed to run gsettings")?;

        if !output.status.success() {
            anyhow::bail!("gsettings set {} failed: {}", key, stderr_message(&output));
        }

        debug!(key = key, "gsettings updated");
    }
    Ok(())
}
