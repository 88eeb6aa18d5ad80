//! Emulator provisioning
//!
//! Runs before a configuration session: seeds default files into the install
//! root, then downloads and unpacks the emulator release if no installed
//! binary is found. Failures here are terminal for provisioning but never
//! for the configuration tool; the caller logs and moves on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::paths::EmulatorPaths;

/// Release archive fetched when no emulator binary is present.
pub const RELEASE_URL: &str =
    "https://github.com/PCSX2/pcsx2/releases/download/v2.4.0/pcsx2-v2.4.0-windows-x64-Qt.zip";

/// BIOS images shipped as seeds when available.
const BIOS_FILES: [&str; 4] = [
    "scph10000-jp.bin",
    "scph50009-cn.bin",
    "scph77001-us.bin",
    "scph77004-eu.bin",
];

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("download rejected with status {0}")]
    Server(reqwest::StatusCode),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One entry of the ROM library index seeded into `roms/games.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEntry {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

/// Ensure the emulator install is usable: directory tree, seed files, and
/// the emulator binary itself (downloaded and unpacked when absent).
pub fn prepare_emulator(paths: &EmulatorPaths) -> Result<(), ProvisionError> {
    for dir in [
        paths.root.clone(),
        paths.inis_dir(),
        paths.bios_dir(),
        paths.roms_dir(),
        paths.covers_dir(),
    ] {
        fs::create_dir_all(&dir)?;
    }

    // Seed failures are worth a warning, nothing more
    if let Err(e) = seed_defaults(paths) {
        warn!("Failed to seed default files: {}", e);
    }

    if let Some(exe) = find_emulator_binary(&paths.root)? {
        info!("Emulator found: {}", exe.display());
        return Ok(());
    }

    let archive = paths.root.join("pcsx2.zip");
    info!("Downloading emulator from {}", RELEASE_URL);
    download(RELEASE_URL, &archive)?;

    info!("Extracting emulator archive");
    extract_archive(&archive, &paths.root)?;
    fs::remove_file(&archive)?;

    let marker = paths.portable_marker();
    if !marker.exists() {
        fs::write(&marker, "")?;
    }

    info!("Emulator installed at {}", paths.root.display());
    Ok(())
}

/// Copy seed files shipped next to the executable into the install root.
/// Existing destinations are never overwritten.
fn seed_defaults(paths: &EmulatorPaths) -> io::Result<()> {
    let defaults = EmulatorPaths::defaults_dir();

    copy_if_absent(
        &defaults.join("default.png"),
        &paths.covers_dir().join("default.png"),
    )?;
    copy_if_absent(
        &defaults.join("PCSX2.ini"),
        &paths.inis_dir().join("PCSX2.ini"),
    )?;
    for bios in BIOS_FILES {
        copy_if_absent(&defaults.join(bios), &paths.bios_dir().join(bios))?;
    }

    // The ROM index gets an empty library when no seed is shipped
    let games = paths.roms_dir().join("games.json");
    if !games.exists() && !copy_if_absent(&defaults.join("games.json"), &games)? {
        let empty: Vec<GameEntry> = Vec::new();
        fs::write(&games, serde_json::to_string_pretty(&empty)?)?;
        info!("Seeded empty ROM index at {}", games.display());
    }

    Ok(())
}

/// Copy `src` to `dst` when `src` exists and `dst` does not. Returns whether
/// a copy happened.
fn copy_if_absent(src: &Path, dst: &Path) -> io::Result<bool> {
    if src.exists() && !dst.exists() {
        fs::copy(src, dst)?;
        return Ok(true);
    }
    Ok(false)
}

/// Look for an installed emulator binary directly under `root`.
fn find_emulator_binary(root: &Path) -> io::Result<Option<PathBuf>> {
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.starts_with("pcsx2") && name.ends_with(".exe") {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Fetch `url` into `output` (blocking).
fn download(url: &str, output: &Path) -> Result<(), ProvisionError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;

    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(ProvisionError::Server(response.status()));
    }

    let bytes = response.bytes()?;
    fs::write(output, &bytes)?;
    Ok(())
}

/// Unpack a zip archive into `dest`.
fn extract_archive(archive: &Path, dest: &Path) -> Result<(), ProvisionError> {
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    zip.extract(dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_if_absent_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, b"seed").unwrap();
        fs::write(&dst, b"existing").unwrap();

        assert!(!copy_if_absent(&src, &dst).unwrap());
        assert_eq!(fs::read(&dst).unwrap(), b"existing");

        fs::remove_file(&dst).unwrap();
        assert!(copy_if_absent(&src, &dst).unwrap());
        assert_eq!(fs::read(&dst).unwrap(), b"seed");
    }

    #[test]
    fn test_copy_if_absent_missing_source_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("dst.bin");
        assert!(!copy_if_absent(&dir.path().join("absent"), &dst).unwrap());
        assert!(!dst.exists());
    }

    #[test]
    fn test_find_emulator_binary() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_emulator_binary(dir.path()).unwrap().is_none());

        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        assert!(find_emulator_binary(dir.path()).unwrap().is_none());

        fs::write(dir.path().join("PCSX2-qt.exe"), b"").unwrap();
        let found = find_emulator_binary(dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "PCSX2-qt.exe");
    }

    #[test]
    fn test_seed_defaults_writes_empty_rom_index() {
        let dir = tempfile::tempdir().unwrap();
        let paths = EmulatorPaths::detect(Some(dir.path().join("emu")));
        paths.ensure_directories().unwrap();

        seed_defaults(&paths).unwrap();

        let games = paths.roms_dir().join("games.json");
        let entries: Vec<GameEntry> =
            serde_json::from_str(&fs::read_to_string(&games).unwrap()).unwrap();
        assert!(entries.is_empty());
    }
}
