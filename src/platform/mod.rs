//! Desktop wallpaper integration
//!
//! Each OS gets the image through its own tooling rather than FFI bindings:
//! gsettings/feh on Linux, osascript on macOS, a PowerShell
//! SystemParametersInfo call on Windows. The commands are stable,
//! documented surfaces and keep this crate free of per-OS binding stacks.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

use std::path::Path;

use anyhow::{Context, Result};

/// Set the desktop background to the image at `path`
///
/// The path is absolutized first; wallpaper APIs resolve relative paths
/// against their own working directory, not ours.
pub async fn set_desktop_background(path: &Path) -> Result<()> {
    let absolute = tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Image file not found: {}", path.display()))?;

    #[cfg(target_os = "linux")]
    return linux::set_desktop_background(&absolute).await;

    #[cfg(target_os = "macos")]
    return macos::set_desktop_background(&absolute).await;

    #[cfg(target_os = "windows")]
    return windows::set_desktop_background(&absolute).await;

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = absolute;
        anyhow::bail!("Setting the desktop background is not supported on this platform")
    }
}

/// Render a failed command's stderr into an error message
fn stderr_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("exit status {}", output.status)
    } else {
        trimmed.to_string()
    }
}
