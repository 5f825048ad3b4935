//! Launch configuration for the Chromium tab host.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use which::which;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChromiumConfig {
    /// Explicit browser binary; detected from PATH and OS defaults when unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,
    pub user_data_dir: PathBuf,
    pub headless: bool,
    /// Per-command deadline for DevTools requests.
    pub request_timeout_ms: u64,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            executable: None,
            user_data_dir: PathBuf::from(".tabpilot/profile"),
            headless: true,
            request_timeout_ms: 30_000,
        }
    }
}

impl ChromiumConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Configured executable, or the first browser found on this host.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        self.executable
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(detect_chrome_executable)
    }

    /// Profile directory made absolute against the working directory.
    pub fn resolve_profile_dir(&self) -> std::io::Result<PathBuf> {
        if self.user_data_dir.is_absolute() {
            return Ok(self.user_data_dir.clone());
        }
        Ok(env::current_dir()?.join(&self.user_data_dir))
    }
}

/// Flags passed to every launched browser.
pub fn launch_args(headless: bool) -> Vec<&'static str> {
    let mut args = vec![
        "--disable-background-networking",
        "--disable-background-timer-throttling",
        "--disable-breakpad",
        "--disable-component-update",
        "--disable-default-apps",
        "--disable-dev-shm-usage",
        "--disable-extensions",
        "--disable-popup-blocking",
        "--disable-sync",
        "--no-first-run",
        "--no-default-browser-check",
        "--password-store=basic",
        "--use-mock-keychain",
    ];
    if headless {
        args.push("--headless=new");
        args.push("--hide-scrollbars");
        args.push("--mute-audio");
    }
    args
}

pub fn detect_chrome_executable() -> Option<PathBuf> {
    chrome_executable_names()
        .iter()
        .find_map(|name| which(name).ok())
        .or_else(|| {
            os_specific_chrome_paths()
                .into_iter()
                .find(|candidate| candidate.exists())
        })
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            Path::new("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome").into(),
            Path::new("/Applications/Chromium.app/Contents/MacOS/Chromium").into(),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        ["ProgramFiles", "ProgramFiles(x86)", "LOCALAPPDATA"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .map(|root| Path::new(&root).join("Google/Chrome/Application/chrome.exe"))
            .collect()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![
            Path::new("/usr/bin/google-chrome").into(),
            Path::new("/usr/bin/chromium").into(),
            Path::new("/snap/bin/chromium").into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_adds_new_headless_flag() {
        assert!(launch_args(true).contains(&"--headless=new"));
        assert!(!launch_args(false).iter().any(|arg| arg.starts_with("--headless")));
    }

    #[test]
    fn explicit_executable_wins_over_detection() {
        let cfg = ChromiumConfig {
            executable: Some(PathBuf::from("/opt/custom/chrome")),
            ..ChromiumConfig::default()
        };
        assert_eq!(
            cfg.resolve_executable(),
            Some(PathBuf::from("/opt/custom/chrome"))
        );
    }

    #[test]
    fn relative_profile_is_anchored_to_cwd() {
        let cfg = ChromiumConfig::default();
        let resolved = cfg.resolve_profile_dir().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".tabpilot/profile"));
    }
}
