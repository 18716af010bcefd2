//! Order-preserving INI documents.
//!
//! Handles the `[SECTION]` / `KEY = value` files used by the simulator's
//! car data. Section and key order survives a load/save cycle; comments do
//! not.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::ConfigError;

/// Keys of a single section, in file order
pub type IniSection = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: IndexMap<String, IniSection>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut doc = Self::new();
        let mut current: Option<String> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                // Anything after the closing bracket, usually a comment, is ignored
                let (name, _) = rest
                    .split_once(']')
                    .ok_or_else(|| parse_error(line_no, "unterminated section header"))?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(parse_error(line_no, "empty section name"));
                }
                if doc.sections.contains_key(name) {
                    return Err(parse_error(line_no, format!("duplicate section [{name}]")));
                }
                doc.sections.insert(name.to_string(), IniSection::new());
                current = Some(name.to_string());
                continue;
            }

            let (key, value) = split_entry(line)
                .ok_or_else(|| parse_error(line_no, format!("expected 'key = value', found '{line}'")))?;
            let section_name = current
                .as_ref()
                .ok_or_else(|| parse_error(line_no, "entry before any section header"))?;
            let section = doc
                .sections
                .get_mut(section_name)
                .ok_or_else(|| parse_error(line_no, "entry before any section header"))?;
            if section.contains_key(key) {
                return Err(parse_error(
                    line_no,
                    format!("duplicate key '{key}' in [{section_name}]"),
                ));
            }
            section.insert(key.to_string(), value.to_string());
        }

        Ok(doc)
    }

    /// Read and parse a file, decoding invalid UTF-8 lossily
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?;
        Self::parse(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_string()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(name)
    }

    /// Get a section, appending an empty one if absent
    pub fn section_mut(&mut self, name: &str) -> &mut IniSection {
        self.sections.entry(name.to_string()).or_default()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.section_mut(section).insert(key.to_string(), value.into());
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, section) in &self.sections {
            writeln!(f, "[{name}]")?;
            for (key, value) in section {
                if value.is_empty() {
                    writeln!(f, "{key} =")?;
                } else {
                    writeln!(f, "{key} = {value}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::Parse {
        line,
        message: message.into(),
    }
}

/// Split on whichever of `=` or `:` comes first
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            let bytes = fs::read(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGINE: &str = "\
; engine definition
[HEADER]
VERSION=1

[ENGINE_DATA]
ALTITUDE_SENSITIVITY=0.1
INERTIA = 0.12
LIMITER: 7500
";

    #[test]
    fn keeps_section_and_key_order() {
        let doc = IniDocument::parse(ENGINE).unwrap();
        assert_eq!(doc.section_names().collect::<Vec<_>>(), ["HEADER", "ENGINE_DATA"]);
        let keys: Vec<&str> = doc.section("ENGINE_DATA").unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["ALTITUDE_SENSITIVITY", "INERTIA", "LIMITER"]);
        assert_eq!(doc.get("ENGINE_DATA", "LIMITER"), Some("7500"));
    }

    #[test]
    fn serializes_in_insertion_order() {
        let doc = IniDocument::parse(ENGINE).unwrap();
        assert_eq!(
            doc.to_string(),
            "[HEADER]\nVERSION = 1\n\n[ENGINE_DATA]\nALTITUDE_SENSITIVITY = 0.1\nINERTIA = 0.12\nLIMITER = 7500\n\n"
        );
        assert_eq!(IniDocument::parse(&doc.to_string()).unwrap(), doc);
    }

    #[test]
    fn entry_outside_section_fails() {
        let err = IniDocument::parse("KEY=1\n[A]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn duplicate_key_fails_with_line() {
        let err = IniDocument::parse("[A]\nK=1\nK=2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 3, .. }));
    }

    #[test]
    fn duplicate_section_fails() {
        assert!(IniDocument::parse("[A]\n[A]\n").is_err());
    }

    #[test]
    fn bad_header_and_bare_words_fail() {
        assert!(IniDocument::parse("[A\n").is_err());
        assert!(IniDocument::parse("[ ]\n").is_err());
        assert!(IniDocument::parse("[A]\njustaword\n").is_err());
    }

    #[test]
    fn header_may_carry_trailing_comment() {
        let doc = IniDocument::parse("[ENGINE_DATA] ; torque and limiter\nLIMITER=7500\n").unwrap();
        assert_eq!(doc.section_names().collect::<Vec<_>>(), ["ENGINE_DATA"]);
        assert_eq!(doc.get("ENGINE_DATA", "LIMITER"), Some("7500"));
    }

    #[test]
    fn ignores_bom_and_keeps_empty_values() {
        let doc = IniDocument::parse("\u{feff}[A]\nEMPTY=\n").unwrap();
        assert_eq!(doc.get("A", "EMPTY"), Some(""));
        assert_eq!(doc.to_string(), "[A]\nEMPTY =\n\n");
    }

    #[test]
    fn set_appends_missing_section_last() {
        let mut doc = IniDocument::parse("[A]\nX=1\n").unwrap();
        doc.set("B", "Y", "2");
        doc.set("A", "X", "3");
        assert_eq!(doc.to_string(), "[A]\nX = 3\n\n[B]\nY = 2\n\n");
    }
}
