//! Emulator install path management
//!
//! Resolves the emulator install root (either supplied on the command line
//! or placed under the platform data directory) and the fixed subpaths the
//! tool reads and writes: the `inis/PCSX2.ini` settings file, the BIOS
//! directory, the ROM library, and cover art.

use anyhow::Context;
use std::path::PathBuf;
use tracing::debug;

/// Application name used for the data directory in managed mode
const APP_NAME: &str = "padconf";

/// Paths under one emulator install root.
#[derive(Debug, Clone)]
pub struct EmulatorPaths {
    /// The emulator install root
    pub root: PathBuf,
}

impl EmulatorPaths {
    /// Resolve the install root. An explicit override wins; otherwise the
    /// emulator lives under the platform data directory (falling back to the
    /// executable's directory when none is available).
    pub fn detect(root_override: Option<PathBuf>) -> Self {
        if let Some(root) = root_override {
            debug!("Using emulator root override: {}", root.display());
            return Self { root };
        }

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        let root = dirs::data_dir()
            .unwrap_or(exe_dir)
            .join(APP_NAME)
            .join("emulator");
        debug!("Using managed emulator root: {}", root.display());
        Self { root }
    }

    /// Directory holding the emulator's INI settings files.
    pub fn inis_dir(&self) -> PathBuf {
        self.root.join("inis")
    }

    /// The settings file the pad mapping is written into.
    pub fn pad_ini(&self) -> PathBuf {
        self.inis_dir().join("PCSX2.ini")
    }

    pub fn bios_dir(&self) -> PathBuf {
        self.root.join("bios")
    }

    pub fn roms_dir(&self) -> PathBuf {
        self.root.join("roms")
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.root.join("covers")
    }

    /// Marker file that keeps the emulator's own state inside the install
    /// root instead of the user profile.
    pub fn portable_marker(&self) -> PathBuf {
        self.root.join("portable.txt")
    }

    /// Directory of seed files shipped next to the executable.
    pub fn defaults_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("defaults")
    }

    /// Create the directory tree the tool expects.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [
            self.root.clone(),
            self.inis_dir(),
            self.bios_dir(),
            self.roms_dir(),
            self.covers_dir(),
        ] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subpaths_hang_off_root() {
        let paths = EmulatorPaths::detect(Some(PathBuf::from("/tmp/emu")));
        assert_eq!(paths.pad_ini(), PathBuf::from("/tmp/emu/inis/PCSX2.ini"));
        assert_eq!(paths.bios_dir(), PathBuf::from("/tmp/emu/bios"));
        assert_eq!(paths.portable_marker(), PathBuf::from("/tmp/emu/portable.txt"));
    }

    #[test]
    fn test_ensure_directories_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let paths = EmulatorPaths::detect(Some(dir.path().join("emu")));

        paths.ensure_directories().unwrap();
        assert!(paths.inis_dir().is_dir());
        assert!(paths.bios_dir().is_dir());
        assert!(paths.roms_dir().is_dir());
        assert!(paths.covers_dir().is_dir());
    }
}
