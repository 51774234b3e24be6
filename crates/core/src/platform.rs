//! Host platform detection.
//!
//! Picks the bundled hex2wav converter and a native audio player for the
//! machine the build runs on. Detection never fails: anything that is not
//! Windows or macOS is treated as Linux.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Bundled converter for Windows hosts.
pub const WINDOWS_CONVERTER: &str = "tools/hex2wav/windows/hex2wav.exe {input} {output}";
/// Bundled converter for macOS hosts.
pub const MACOS_CONVERTER: &str = "tools/hex2wav/macosx/hex2wav {input} {output}";
/// Bundled converter for 64-bit Linux hosts.
pub const LINUX64_CONVERTER: &str = "tools/hex2wav/linux/hex2wav64_bin {input} {output}";
/// Bundled converter for 32-bit Linux hosts.
pub const LINUX32_CONVERTER: &str = "tools/hex2wav/linux/hex2wav32_bin {input} {output}";

/// Plays synchronously through .NET's `SoundPlayer`; PowerShell joins the
/// words after `-Command` back into one script.
pub const WINDOWS_PLAYER: &str =
    "powershell -NoProfile -NonInteractive -Command (New-Object Media.SoundPlayer '{output}').PlaySync()";
pub const MACOS_PLAYER: &str = "afplay {output}";
pub const LINUX_PLAYER: &str = "aplay -q {output}";

/// Architecture names treated as 64-bit even without a literal "64".
const KNOWN_64_BIT_ARCHES: [&str; 3] = ["x86_64", "amd64", "aarch64"];

/// Operating system family, as far as default tool selection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    Windows,
    MacOs,
    /// Linux and everything unrecognized.
    Other,
}

impl OsFamily {
    /// Classifies an OS name such as `std::env::consts::OS` or `uname -s` output.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "windows" => Self::Windows,
            "macos" | "darwin" => Self::MacOs,
            _ => Self::Other,
        }
    }
}

/// The host as reported by the OS: family name and machine architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    os: String,
    arch: String,
}

impl HostPlatform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into().trim().to_ascii_lowercase(),
            arch: arch.into().trim().to_ascii_lowercase(),
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn family(&self) -> OsFamily {
        OsFamily::from_name(&self.os)
    }

    /// Whether the architecture string looks 64-bit.
    pub fn is_64_bit(&self) -> bool {
        self.arch.contains("64") || KNOWN_64_BIT_ARCHES.contains(&self.arch.as_str())
    }
}

/// Default converter and player templates for a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDefaults {
    pub converter: String,
    pub player: String,
}

/// Returns the default converter and player templates for `host`.
pub fn default_commands(host: &HostPlatform) -> PlatformDefaults {
    let (converter, player) = match host.family() {
        OsFamily::Windows => (WINDOWS_CONVERTER, WINDOWS_PLAYER),
        OsFamily::MacOs => (MACOS_CONVERTER, MACOS_PLAYER),
        OsFamily::Other if host.is_64_bit() => (LINUX64_CONVERTER, LINUX_PLAYER),
        OsFamily::Other => (LINUX32_CONVERTER, LINUX_PLAYER),
    };

    let binary = converter.split_whitespace().next().unwrap_or(converter);
    info!(
        "Auto-detected OS: {} ({}) -> {}",
        host.os(),
        host.arch(),
        binary
    );

    PlatformDefaults {
        converter: converter.to_string(),
        player: player.to_string(),
    }
}
