//! Build platforms and their artifact naming.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A target platform a build job runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    #[default]
    Linux,
    Windows,
    #[serde(rename = "macos-x86")]
    #[value(name = "macos-x86")]
    MacosX86,
    #[serde(rename = "macos-arm")]
    #[value(name = "macos-arm")]
    MacosArm,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Linux,
        Platform::Windows,
        Platform::MacosX86,
        Platform::MacosArm,
    ];

    /// Selector name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::MacosX86 => "macos-x86",
            Platform::MacosArm => "macos-arm",
        }
    }

    /// Suffix appended to uploaded binary names.
    pub fn asset_suffix(&self) -> &'static str {
        match self {
            Platform::Linux => "linux-x86_64",
            Platform::Windows => "windows-x86_64",
            Platform::MacosX86 => "macos-x86_64",
            Platform::MacosArm => "macos-aarch64",
        }
    }

    /// Executable file extension, including the dot.
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            _ => "",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
