//! Hand a URL to the system browser.

use super::types::BrowserLaunch;
use std::process::{Command, Stdio};

#[cfg(target_os = "macos")]
const OPENERS: &[&str] = &["open"];
#[cfg(target_os = "windows")]
const OPENERS: &[&str] = &["explorer.exe"];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENERS: &[&str] = &["xdg-open", "gio", "sensible-browser"];

/// Try each platform opener until one starts.
///
/// `Blocked` means nothing could be launched and the caller has to show the
/// URL so it can be opened by hand.
pub fn open_url(url: &str) -> BrowserLaunch {
    open_with(OPENERS, url)
}

fn open_with(openers: &[&str], url: &str) -> BrowserLaunch {
    for opener in openers {
        let mut cmd = Command::new(opener);
        if *opener == "gio" {
            cmd.arg("open");
        }
        let spawned = cmd
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => {
                tracing::debug!("Opened browser with {}", opener);
                return BrowserLaunch::Opened;
            }
            Err(e) => tracing::debug!("{} unavailable: {}", opener, e),
        }
    }
    tracing::warn!("No URL opener could be started");
    BrowserLaunch::Blocked
}
