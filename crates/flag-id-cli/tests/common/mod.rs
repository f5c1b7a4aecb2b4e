//! Shared fixtures for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use flag_id_core::FlagImage;
use flag_id_test_support::{colors, save_png, SyntheticFlagBuilder};
use tempfile::TempDir;

/// Reference flag with a solid red field (ratio 1).
pub fn red() -> FlagImage {
    SyntheticFlagBuilder::solid("Red", 60, 40, colors::RED)
}

/// Reference flag with a solid green field.
pub fn green() -> FlagImage {
    SyntheticFlagBuilder::solid("Green", 60, 40, colors::GREEN)
}

/// Red/white halves: same bucket and ratio as `stripes`, few edges.
pub fn split() -> FlagImage {
    SyntheticFlagBuilder::split("Split", 96, 64, colors::RED, colors::WHITE)
}

/// Red/white 8px stripes: many edges.
pub fn stripes() -> FlagImage {
    SyntheticFlagBuilder::vertical_stripes("Stripes", 96, 64, 8, colors::RED, colors::WHITE)
}

/// A temporary working directory with a reference corpus in `flags/`.
pub struct Fixture {
    root: TempDir,
}

impl Fixture {
    /// Creates a fixture whose corpus holds Red, Green, Split and Stripes.
    pub fn new() -> Self {
        Self::with_flags(&[red(), green(), split(), stripes()])
    }

    /// Creates a fixture with the given reference flags.
    pub fn with_flags(flags: &[FlagImage]) -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("flags")).unwrap();
        std::fs::create_dir(root.path().join("queries")).unwrap();
        std::fs::create_dir(root.path().join("xdg")).unwrap();
        for flag in flags {
            save_png(flag, &root.path().join("flags")).unwrap();
        }
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn corpus(&self) -> PathBuf {
        self.root.path().join("flags")
    }

    pub fn queries(&self) -> PathBuf {
        self.root.path().join("queries")
    }

    /// Saves `flag` as a query image named `name` and returns its path.
    pub fn query(&self, flag: &FlagImage, name: &str) -> PathBuf {
        let query = SyntheticFlagBuilder::renamed(flag, name);
        save_png(&query, &self.queries()).unwrap()
    }

    /// Writes a project config in the working directory.
    pub fn project_config(&self, toml: &str) {
        std::fs::write(self.root.path().join(".flag-id.toml"), toml).unwrap();
    }

    /// Writes a user (XDG) config.
    pub fn xdg_config(&self, toml: &str) {
        let dir = self.root.path().join("xdg").join("flag-id");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), toml).unwrap();
    }

    /// The binary, run inside the fixture with an isolated XDG directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("flag-id").unwrap();
        cmd.current_dir(self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join("xdg"))
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Parses JSON Lines output.
pub fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}
