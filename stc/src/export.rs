//! Writes the descriptor set in the two on-disk conventions downstream
//! tools consume. The layouts are independent of each other; a consumer of
//! one never reads the other.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{extract::StcFormat, Result};

const DATA_MINER_DIR: &str = "gfl-data-miner";
const DECOMPRESS_DIR: &str = "GFDecompress";

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub enabled: bool,
    /// Output root. Deleted in its entirety before every export; hosts
    /// usually place it under the user's documents directory.
    pub path: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            path: ["girls-frontline", "stc-format"].iter().collect(),
        }
    }
}

/// Recursively deletes any previous export under `path`. Everything below
/// `path` is unrecoverable once this returns; [`export`] calls it exactly
/// once, before the first write.
pub fn clear_output(path: &Path) -> Result<()> {
    if path.exists() {
        debug!("recursively deleting directory {}", path.display());
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Writes both layouts under `root`, wiping it first.
pub fn export(formats: &BTreeMap<i32, StcFormat>, root: &Path) -> Result<()> {
    clear_output(root)?;
    export_data_miner(formats, &root.join(DATA_MINER_DIR))?;
    export_decompress(formats, &root.join(DECOMPRESS_DIR))?;
    Ok(())
}

/// gfl-data-miner layout: `<id>.json` per descriptor, pretty-printed with
/// 4-space indentation.
fn export_data_miner(formats: &BTreeMap<i32, StcFormat>, dir: &Path) -> Result<()> {
    for (id, format) in formats {
        fs::create_dir_all(dir)?;
        let mut data = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut data, PrettyFormatter::with_indent(b"    "));
        format.serialize(&mut serializer)?;
        fs::write(dir.join(format!("{id}.json")), data)?;
    }
    Ok(())
}

/// GFDecompress layout: `<id>.format` with one field name per line, plus a
/// `mapping.txt` associating `<id>.stc` files with command names.
fn export_decompress(formats: &BTreeMap<i32, StcFormat>, dir: &Path) -> Result<()> {
    for (id, format) in formats {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(format!("{id}.format")), format.fields.join("\n"))?;
    }

    let mapping = formats
        .iter()
        .map(|(id, format)| format!("{{ \"{id}.stc\", \"{}\" }}", format.name))
        .collect::<Vec<_>>()
        .join(",\n");
    fs::create_dir_all(dir)?;
    fs::write(dir.join("mapping.txt"), mapping)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_formats() -> BTreeMap<i32, StcFormat> {
        BTreeMap::from([
            (
                1,
                StcFormat {
                    name: "foo".to_string(),
                    fields: vec!["id".to_string(), "value".to_string()],
                },
            ),
            (
                2,
                StcFormat {
                    name: "bar".to_string(),
                    fields: vec!["x".to_string()],
                },
            ),
        ])
    }

    #[test]
    fn writes_data_miner_layout() {
        let dir = TempDir::new().unwrap();
        export(&sample_formats(), dir.path()).unwrap();

        let json = fs::read_to_string(dir.path().join("gfl-data-miner/1.json")).unwrap();
        assert_eq!(
            json,
            "{\n    \"name\": \"foo\",\n    \"fields\": [\n        \"id\",\n        \"value\"\n    ]\n}"
        );
    }

    #[test]
    fn writes_decompress_layout() {
        let dir = TempDir::new().unwrap();
        export(&sample_formats(), dir.path()).unwrap();

        let format = fs::read_to_string(dir.path().join("GFDecompress/1.format")).unwrap();
        assert_eq!(format, "id\nvalue");

        let mapping = fs::read_to_string(dir.path().join("GFDecompress/mapping.txt")).unwrap();
        assert_eq!(mapping, "{ \"1.stc\", \"foo\" },\n{ \"2.stc\", \"bar\" }");
    }

    #[test]
    fn layouts_are_independent() {
        let dir = TempDir::new().unwrap();
        export(&sample_formats(), dir.path()).unwrap();

        fs::remove_dir_all(dir.path().join("GFDecompress")).unwrap();
        let json = fs::read_to_string(dir.path().join("gfl-data-miner/2.json")).unwrap();
        assert!(json.contains("\"bar\""));
    }

    #[test]
    fn wipes_previous_output() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("gfl-data-miner/999.json");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "{}").unwrap();

        export(&sample_formats(), dir.path()).unwrap();
        assert!(!stale.exists());
        assert!(dir.path().join("gfl-data-miner/1.json").exists());
    }

    #[test]
    fn empty_fields_yield_empty_format_file() {
        let formats = BTreeMap::from([(
            7,
            StcFormat {
                name: "empty".to_string(),
                fields: vec![],
            },
        )]);
        let dir = TempDir::new().unwrap();
        export(&formats, dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("GFDecompress/7.format")).unwrap(),
            ""
        );
    }
}
