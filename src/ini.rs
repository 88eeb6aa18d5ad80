//! Minimal INI document model for the emulator's settings file
//!
//! The emulator owns this file; we only ever rewrite the `[Pad1]` section and
//! must leave every other section byte-equivalent in content. Keys are
//! case-sensitive and must not be normalized. Values may be empty
//! (`Key = ` means unbound).

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IniError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("malformed line {line} in {path}: {text:?}")]
    Malformed {
        path: PathBuf,
        line: usize,
        text: String,
    },
}

#[derive(Debug, Clone)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

/// An ordered, case-preserving view of an INI file.
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    sections: Vec<Section>,
}

impl IniDocument {
    /// Parse the file at `path`. Comments (`;` or `#`) and blank lines are
    /// dropped; everything else must be a section header or a `key = value`
    /// pair inside a section.
    pub fn load(path: &Path) -> Result<Self, IniError> {
        let text = std::fs::read_to_string(path).map_err(|source| IniError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, IniError> {
        let mut sections: Vec<Section> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(IniError::Malformed {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    text: raw.to_string(),
                });
            };

            let Some(section) = sections.last_mut() else {
                return Err(IniError::Malformed {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    text: raw.to_string(),
                });
            };

            section
                .entries
                .push((key.trim().to_string(), value.trim().to_string()));
        }

        Ok(Self { sections })
    }

    /// Entries of a section, in file order.
    pub fn section(&self, name: &str) -> Option<&[(String, String)]> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.entries.as_slice())
    }

    /// Look up one value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace a section's entries wholesale, keeping its position in the
    /// file. A missing section is appended at the end.
    pub fn replace_section(&mut self, name: &str, entries: Vec<(String, String)>) {
        if let Some(section) = self.sections.iter_mut().find(|s| s.name == name) {
            section.entries = entries;
        } else {
            self.sections.push(Section {
                name: name.to_string(),
                entries,
            });
        }
    }

    /// Serialize and write the whole document.
    pub fn write(&self, path: &Path) -> Result<(), IniError> {
        let mut out = String::new();
        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for (key, value) in &section.entries {
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(value);
                out.push('\n');
            }
            out.push('\n');
        }

        std::fs::write(path, out).map_err(|source| IniError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> IniDocument {
        IniDocument::parse(text, Path::new("test.ini")).unwrap()
    }

    #[test]
    fn test_parse_preserves_key_case() {
        let d = doc("[Pad1]\nCross = SDL-0/Button2\nLLeft = SDL-0/-LeftX\n");
        assert_eq!(d.get("Pad1", "Cross"), Some("SDL-0/Button2"));
        assert_eq!(d.get("Pad1", "LLeft"), Some("SDL-0/-LeftX"));
        // No lower-cased alias exists
        assert_eq!(d.get("Pad1", "cross"), None);
    }

    #[test]
    fn test_empty_values_parse() {
        let d = doc("[Pad1]\nUp = \nDown =\n");
        assert_eq!(d.get("Pad1", "Up"), Some(""));
        assert_eq!(d.get("Pad1", "Down"), Some(""));
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let d = doc("; header comment\n\n[Pad1]\n# note\nStart = SDL-0/Button9\n");
        assert_eq!(d.get("Pad1", "Start"), Some("SDL-0/Button9"));
    }

    #[test]
    fn test_entry_outside_section_is_malformed() {
        let err = IniDocument::parse("Up = x\n", Path::new("t.ini")).unwrap_err();
        assert!(matches!(err, IniError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_replace_keeps_other_sections() {
        let mut d = doc("[EmuCore]\nEnableWideScreenPatches = true\n\n[Pad1]\nUp = old\n");
        d.replace_section("Pad1", vec![("Up".into(), "SDL-0/DPadUp".into())]);
        assert_eq!(d.get("EmuCore", "EnableWideScreenPatches"), Some("true"));
        assert_eq!(d.get("Pad1", "Up"), Some("SDL-0/DPadUp"));
        assert_eq!(d.section("Pad1").unwrap().len(), 1);
    }

    #[test]
    fn test_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PCSX2.ini");

        let mut d = IniDocument::default();
        d.replace_section(
            "Pad1",
            vec![
                ("Type".into(), "DualShock2".into()),
                ("Cross".into(), "SDL-0/Button2".into()),
            ],
        );
        d.write(&path).unwrap();

        let back = IniDocument::load(&path).unwrap();
        assert_eq!(back.get("Pad1", "Type"), Some("DualShock2"));
        assert_eq!(back.get("Pad1", "Cross"), Some("SDL-0/Button2"));
    }
}
