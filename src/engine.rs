//! `engine.ini` handling: attach a torque-curve LUT to an engine definition.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::ConfigError;
use crate::ini::IniDocument;

pub const ENGINE_SECTION: &str = "ENGINE_DATA";
pub const TORQUE_CURVE_KEY: &str = "TORQUE_CURVE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    doc: IniDocument,
}

impl EngineConfig {
    /// Load an engine config. A missing file starts an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match IniDocument::load(path) {
            Ok(doc) => {
                debug!("Loaded engine config {}", path.display());
                Ok(Self { doc })
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("{} does not exist, starting from an empty config", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.doc.save(path)?;
        info!("Saved engine config {}", path.display());
        Ok(())
    }

    pub fn torque_curve(&self) -> Option<&str> {
        self.doc.get(ENGINE_SECTION, TORQUE_CURVE_KEY)
    }

    /// Point `ENGINE_DATA/TORQUE_CURVE` at a LUT file, creating the section if needed
    pub fn set_torque_curve(&mut self, lut_path: &Path) {
        self.doc
            .set(ENGINE_SECTION, TORQUE_CURVE_KEY, lut_path.display().to_string());
    }

    pub fn document(&self) -> &IniDocument {
        &self.doc
    }
}

/// An engine config together with the file it belongs to
#[derive(Debug)]
pub struct EngineSession {
    path: PathBuf,
    config: EngineConfig,
}

impl EngineSession {
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            path: path.to_path_buf(),
            config: EngineConfig::load(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Set the torque curve and write the config straight back to its file
    pub fn attach_torque_curve(&mut self, lut_path: &Path) -> Result<(), ConfigError> {
        self.config.set_torque_curve(lut_path);
        self.config.save(&self.path)
    }
}
