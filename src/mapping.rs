//! Mapping Store: the in-memory `[Pad1]` mapping and its persistence
//!
//! The store holds one binding string per [`LogicalControl`]. It is loaded
//! once at session start (synthesizing an all-empty file if none exists) and
//! written back only on explicit confirm. On save, the nine derived keys are
//! recomputed from the selected device index and always win over whatever
//! the file or the session held for them; empty bindings are omitted.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::binding::{self, DERIVED_TOKENS};
use crate::controls::{LogicalControl, CAPTURABLE};
use crate::ini::{IniDocument, IniError};

/// Section rewritten on save. Everything else in the file is preserved.
pub const PAD_SECTION: &str = "Pad1";

/// Fixed controller template tag.
pub const PAD_TYPE: &str = "DualShock2";

#[derive(Debug, Error)]
pub enum MappingError {
    #[error(transparent)]
    Ini(#[from] IniError),

    #[error("failed to create {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
}

/// The full mapping from logical control to binding string for one pad.
#[derive(Debug, Clone)]
pub struct MappingSet {
    entries: HashMap<LogicalControl, String>,
}

impl Default for MappingSet {
    fn default() -> Self {
        let mut entries = HashMap::new();
        for control in CAPTURABLE {
            entries.insert(control, String::new());
        }
        for (control, _) in DERIVED_TOKENS {
            entries.insert(control, String::new());
        }
        Self { entries }
    }
}

impl MappingSet {
    /// Current binding for a control; empty string means unbound.
    pub fn get(&self, control: LogicalControl) -> &str {
        self.entries.get(&control).map_or("", |s| s.as_str())
    }

    /// Assign a binding.
    pub fn set(&mut self, control: LogicalControl, value: String) {
        self.entries.insert(control, value);
    }

    /// Clear every binding. The file is untouched until the next save.
    pub fn reset(&mut self) {
        for value in self.entries.values_mut() {
            value.clear();
        }
    }

    /// Overwrite all bindings with the standard-layout template for
    /// `device_index`, discarding prior bindings. The device's actual
    /// capability mapping is not probed.
    pub fn auto_configure(&mut self, device_index: usize) {
        self.reset();
        let prefix = binding::prefix(device_index);
        for (control, token) in binding::AUTO_TOKENS {
            self.entries.insert(control, format!("{}{}", prefix, token));
        }
        info!("Applied auto-configure template for device {}", device_index);
    }

    /// Load the mapping from `path`.
    ///
    /// A missing file is not an error: an all-empty mapping is synthesized,
    /// written to `path` (creating parent directories), and returned. A file
    /// without a `[Pad1]` section yields the all-empty mapping.
    pub fn load(path: &Path) -> Result<Self, MappingError> {
        if !path.exists() {
            let set = Self::default();
            set.write_default(path)?;
            info!("Created default pad settings at {}", path.display());
            return Ok(set);
        }

        let doc = IniDocument::load(path)?;
        let mut set = Self::default();
        if let Some(entries) = doc.section(PAD_SECTION) {
            for (key, value) in entries {
                if let Some(control) = LogicalControl::from_ini_key(key) {
                    set.entries.insert(control, value.clone());
                }
            }
            debug!("Loaded {} pad entries from {}", entries.len(), path.display());
        }
        Ok(set)
    }

    /// Seed a fresh file with the full key set, every binding empty.
    fn write_default(&self, path: &Path) -> Result<(), MappingError> {
        ensure_parent(path)?;

        let mut entries = vec![("Type".to_string(), PAD_TYPE.to_string())];
        for control in CAPTURABLE {
            entries.push((control.ini_key().to_string(), self.get(control).to_string()));
        }
        for (control, _) in DERIVED_TOKENS {
            entries.push((control.ini_key().to_string(), self.get(control).to_string()));
        }

        let mut doc = IniDocument::default();
        doc.replace_section(PAD_SECTION, entries);
        doc.write(path)?;
        Ok(())
    }

    /// Write the mapping to `path`, merging with the file's other sections.
    ///
    /// Non-empty captured bindings are written as-is; empty ones are omitted
    /// entirely. The nine derived keys and the type tag are recomputed from
    /// `device_index` and always written, replacing any stale values.
    pub fn save(&self, path: &Path, device_index: usize) -> Result<(), MappingError> {
        ensure_parent(path)?;

        let mut doc = if path.exists() {
            IniDocument::load(path)?
        } else {
            IniDocument::default()
        };

        let mut entries = Vec::new();
        for control in CAPTURABLE {
            let value = self.get(control);
            if !value.trim().is_empty() {
                entries.push((control.ini_key().to_string(), value.to_string()));
            }
        }

        let prefix = binding::prefix(device_index);
        for (control, token) in DERIVED_TOKENS {
            entries.push((control.ini_key().to_string(), format!("{}{}", prefix, token)));
        }
        entries.push(("Type".to_string(), PAD_TYPE.to_string()));

        doc.replace_section(PAD_SECTION, entries);
        doc.write(path)?;

        info!("Saved pad settings to {}", path.display());
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<(), MappingError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| MappingError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
