//! Windows wallpaper setting via SystemParametersInfo
//!
//! Invoked through PowerShell P/Invoke rather than a Rust windows-API
//! binding. SPI_SETDESKWALLPAPER = 20; fWinIni = 3 persists the change to
//! the user profile and broadcasts the settings change.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use super::stderr_message;

const PINVOKE_WALLPAPER: &str = r#"Add-Type -TypeDefinition @"
using System.Runtime.InteropServices;
public class Wallpaper {
    [DllImport("user32.dll", SetLastError = true)]
    public static extern int SystemParametersInfo(int uAction, int uParam, string lpvParam, int fuWinIni);
}
"@
"#;

pub async fn set_desktop_background(path: &Path) -> Result<()> {
    // PowerShell single-quoted strings escape ' by doubling it
    let quoted = path.display().to_string().replace('\'', "''");
    let script = format!(
        "{}\nif ([Wallpaper]::SystemParametersInfo(20, 0, '{}', 3) -eq 0) {{ exit 1 }}",
        PINVOKE_WALLPAPER, quoted
    );

    let output = Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", &script])
        .output()
        .await
        .context("Failed to run powershell")?;

    if !output.status.success() {
        anyhow::bail!("SystemParametersInfo failed: {}", stderr_message(&output));
    }

    debug!("Wallpaper set via SystemParametersInfo");
    Ok(())
}
