//! Read-only view of the `[GEARBOX]` section of a drivetrain file.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::ConfigError;
use crate::ini::{IniDocument, IniSection};

pub const GEARBOX_SECTION: &str = "GEARBOX";

/// Read the gearbox section as a flat key/value mapping.
/// An absent section yields an empty mapping.
pub fn read_gearbox_section(path: &Path) -> Result<IniSection, ConfigError> {
    let doc = IniDocument::load(path)?;
    let values = doc.section(GEARBOX_SECTION).cloned().unwrap_or_default();
    debug!("Read {} gearbox values from {}", values.len(), path.display());
    Ok(values)
}

/// Gearbox values shown in the UI. Loading never fails: errors leave the
/// view empty and are handed back for the caller to report.
#[derive(Debug, Default)]
pub struct GearboxView {
    path: Option<PathBuf>,
    values: IniSection,
}

impl GearboxView {
    pub fn load(&mut self, path: &Path) -> Option<ConfigError> {
        self.path = Some(path.to_path_buf());
        match read_gearbox_section(path) {
            Ok(values) => {
                self.values = values;
                None
            }
            Err(e) => {
                warn!("Could not read gearbox values from {}: {e}", path.display());
                self.values.clear();
                Some(e)
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn values(&self) -> &IniSection {
        &self.values
    }
}
