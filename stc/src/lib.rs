use log::debug;
use thiserror::Error;

pub mod export;
pub mod extract;
pub mod model;

use export::ExportOptions;
use model::TypeModel;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("Type not found: {0}")]
    TypeNotFound(String),
    #[error("Field name not of the form stc...List: {0}")]
    FieldName(String),
    #[error("Enum field without default value: {0}")]
    MissingDefault(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Post-type-model stage of the host pipeline: extracts the descriptor set
/// from `model` and writes both export layouts.
///
/// Returns `Ok(false)` without touching the file system when export is
/// disabled or when `model` was not derived from the preferred architecture
/// (a multi-architecture release is processed once per architecture, and
/// only one variant's descriptors are exported). Extraction and export
/// errors are fatal for the pass; no partial output is left behind beyond
/// the destructive wipe of the output root documented on
/// [`export::clear_output`].
pub fn export_stc_formats(
    model: &TypeModel,
    preferred_arch: Option<&str>,
    options: &ExportOptions,
) -> Result<bool> {
    if !options.enabled {
        debug!("STC format files export is disabled; skipping");
        return Ok(false);
    }
    if preferred_arch != Some(model.arch()) {
        debug!("skipping STC format files export for arch {}", model.arch());
        return Ok(false);
    }

    let formats = extract::extract(model)?;
    export::export(&formats, &options.path)?;
    Ok(true)
}
