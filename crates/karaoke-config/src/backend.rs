use crate::paths::{ConfigError, KaraokePaths};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

// toml_edit keeps user comments and layout when a section is rewritten
use toml_edit::{DocumentMut, Item};

pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;

  /// Like [`ConfigBackend::load_section`] but a missing file or section
  /// yields `T::default()`.
  fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default;
}

pub struct TomlConfigBackend {
  paths: KaraokePaths,
}

impl TomlConfigBackend {
  pub fn new(paths: KaraokePaths) -> Self {
    Self { paths }
  }

  pub fn paths(&self) -> &KaraokePaths {
    &self.paths
  }

  fn read_table(&self) -> Result<Option<toml::Table>, ConfigError> {
    let path = self.paths.config_file();
    match karaoke_fs::read_optional(&path)? {
      Some(content) => Ok(Some(toml::from_str::<toml::Table>(&content)?)),
      None => Ok(None),
    }
  }
}

fn decode_section<T: DeserializeOwned>(section: &str, value: &toml::Value) -> Result<T, ConfigError> {
  value.clone().try_into().map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.paths.config_file();
    let content = fs::read_to_string(&path)?;
    let table: toml::Table = toml::from_str(&content)?;

    let value = table
      .get(section)
      .ok_or_else(|| ConfigError::Other(format!("missing section [{section}] in {:?}", path)))?;

    decode_section(section, value)
  }

  fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    let Some(table) = self.read_table()? else {
      return Ok(T::default());
    };

    let Some(value) = table.get(section) else {
      return Ok(T::default());
    };

    decode_section(section, value)
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    let path = self.paths.config_file();

    // 1) Current document, or an empty one on first run.
    let mut doc: DocumentMut = match karaoke_fs::read_optional(&path)? {
      Some(content) => content
        .parse::<DocumentMut>()
        .map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?,
      None => DocumentMut::new(),
    };

    // 2) Serialize the section on its own ("foo = 1\nbar = 2\n", no header).
    let section_str =
      toml::to_string(value).map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;

    // 3) Reparse it as a table item.
    let section_item: Item = section_str
      .parse::<DocumentMut>()
      .map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?
      .into_item();

    // 4) Replace the section at the root, leaving the rest untouched.
    doc[section] = section_item;

    karaoke_fs::atomic_write_str(&path, &doc.to_string())?;
    tracing::debug!(section, path = %path.display(), "config section saved");

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use tempfile::tempdir;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Sample {
    level: u32,
    name: String,
  }

  impl Default for Sample {
    fn default() -> Self {
      Self { level: 30, name: "default".into() }
    }
  }

  fn backend(dir: &std::path::Path) -> TomlConfigBackend {
    TomlConfigBackend::new(KaraokePaths::under(dir).unwrap())
  }

  #[test]
  fn missing_file_gives_default() {
    let tmp = tempdir().unwrap();
    let b = backend(tmp.path());

    let s: Sample = b.load_section_with_default("sample").unwrap();
    assert_eq!(s, Sample::default());
    assert!(b.load_section::<Sample>("sample").is_err());
  }

  #[test]
  fn save_then_load_section() {
    let tmp = tempdir().unwrap();
    let b = backend(tmp.path());
    let value = Sample { level: 55, name: "hall".into() };

    b.save_section("sample", &value).unwrap();

    assert_eq!(b.load_section::<Sample>("sample").unwrap(), value);
    assert_eq!(b.load_section_with_default::<Sample>("other").unwrap(), Sample::default());
  }

  #[test]
  fn saving_keeps_other_sections_and_comments() {
    let tmp = tempdir().unwrap();
    let b = backend(tmp.path());
    std::fs::write(b.paths().config_file(), "# my settings\n[other]\nkeep = true\n").unwrap();

    b.save_section("sample", &Sample::default()).unwrap();

    let written = std::fs::read_to_string(b.paths().config_file()).unwrap();
    assert!(written.contains("# my settings"));
    assert!(written.contains("keep = true"));
    assert!(written.contains("level = 30"));
  }

  #[test]
  fn wrong_types_are_reported() {
    let tmp = tempdir().unwrap();
    let b = backend(tmp.path());
    std::fs::write(b.paths().config_file(), "[sample]\nlevel = \"loud\"\nname = \"x\"\n").unwrap();

    let err = b.load_section_with_default::<Sample>("sample").unwrap_err();
    assert!(matches!(err, ConfigError::Other(_)));
  }
}
