//! The LUT being edited, where it came from, and what has happened to it.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::backup::{BackupLedger, BackupOutcome};
use crate::error::LutError;
use crate::lut::{read_lut, write_lut, Delimiter, LutPoint, LutTable};
use crate::point_editor::PointEditor;

/// Scratch file written next to the active LUT on refresh
pub const TEMP_FILE_NAME: &str = "temp_lut.lut";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Reloaded(PathBuf),
    /// The temp file was gone by the time it should be re-read
    TempMissing(PathBuf),
}

#[derive(Debug)]
pub struct LutSession {
    path: PathBuf,
    delimiter: Delimiter,
    table: LutTable,
    editor: PointEditor,
    dirty: bool,
}

impl LutSession {
    /// Load a LUT and make sure its original contents are backed up
    pub fn open(
        path: &Path,
        delimiter: Delimiter,
        hit_radius: f32,
        backups: &mut BackupLedger,
    ) -> Result<(Self, BackupOutcome), LutError> {
        let table = read_lut(path, delimiter)?;
        let backup = backups.ensure(path)?;
        info!("Loaded {} ({} points)", path.display(), table.len());
        Ok((
            Self {
                path: path.to_path_buf(),
                delimiter,
                table,
                editor: PointEditor::new(hit_radius),
                dirty: false,
            },
            backup,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn table(&self) -> &LutTable {
        &self.table
    }

    pub fn editor(&self) -> &PointEditor {
        &self.editor
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn temp_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) => dir.join(TEMP_FILE_NAME),
            None => PathBuf::from(TEMP_FILE_NAME),
        }
    }

    pub fn set_hit_radius(&mut self, radius: f32) {
        self.editor.set_hit_radius(radius);
    }

    pub fn press<F>(&mut self, pointer: [f32; 2], to_screen: F) -> Option<usize>
    where
        F: Fn(LutPoint) -> [f32; 2],
    {
        self.editor.press(&self.table, pointer, to_screen)
    }

    pub fn motion(&mut self, y: f64) -> bool {
        let changed = self.editor.motion(&mut self.table, y);
        self.dirty |= changed;
        changed
    }

    pub fn release(&mut self) {
        self.editor.release();
    }

    pub fn set_point(&mut self, index: usize, point: LutPoint) -> bool {
        let changed = self.table.get(index) != Some(point) && self.table.set_point(index, point);
        self.dirty |= changed;
        changed
    }

    /// Append a point one step past the last input, keeping its output
    pub fn add_point(&mut self) {
        let points = self.table.points();
        let next = match points {
            [.., prev, last] => LutPoint::new(last.x + (last.x - prev.x), last.y),
            [last] => LutPoint::new(last.x + 1.0, last.y),
            [] => LutPoint::new(0.0, 0.0),
        };
        self.table.push(next);
        self.dirty = true;
    }

    /// A LUT always keeps at least one point
    pub fn can_remove_point(&self) -> bool {
        self.table.len() > 1
    }

    pub fn remove_point(&mut self, index: usize) -> Option<LutPoint> {
        if !self.can_remove_point() {
            warn!("Refusing to remove the last point of {}", self.path.display());
            return None;
        }
        self.editor.release();
        let removed = self.table.remove(index);
        self.dirty |= removed.is_some();
        removed
    }

    /// Write back to the file the table was loaded from
    pub fn save(&mut self) -> Result<(), LutError> {
        write_lut(&self.table, &self.path, self.delimiter)?;
        self.dirty = false;
        info!("Saved {}", self.path.display());
        Ok(())
    }

    /// Write a copy elsewhere; the session keeps editing the original path
    pub fn save_as(&self, path: &Path) -> Result<(), LutError> {
        write_lut(&self.table, path, self.delimiter)?;
        info!("Saved copy of {} to {}", self.path.display(), path.display());
        Ok(())
    }

    /// Round-trip the table through the temp file and adopt what was read back
    pub fn refresh(&mut self) -> Result<RefreshOutcome, LutError> {
        self.write_temp()?;
        self.reload_temp()
    }

    /// Write the current table to the temp file next to the source
    pub fn write_temp(&self) -> Result<PathBuf, LutError> {
        let temp = self.temp_path();
        write_lut(&self.table, &temp, self.delimiter)?;
        Ok(temp)
    }

    /// Replace the table with the temp file's contents, if it is still there
    pub fn reload_temp(&mut self) -> Result<RefreshOutcome, LutError> {
        let temp = self.temp_path();
        if !temp.exists() {
            warn!("Temp file {} not found, keeping current table", temp.display());
            return Ok(RefreshOutcome::TempMissing(temp));
        }
        self.table = read_lut(&temp, self.delimiter)?;
        self.editor.release();
        info!("Refreshed {} from {}", self.path.display(), temp.display());
        Ok(RefreshOutcome::Reloaded(temp))
    }
}
