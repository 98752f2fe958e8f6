//! Walks the type model from the command-definition root to one format
//! descriptor per numeric command id.
//!
//! `Cmd.CmdDef` declares one enum field per command, named `stc<Name>List`,
//! whose default value is the command id. The record layout for command
//! `<name>` lives in the type `Cmd.Stc<Name>`; its public fields, in
//! declaration order, are the columns of the serialized record.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{model::TypeModel, Error, Result};

pub const COMMAND_DEF_TYPE: &str = "Cmd.CmdDef";

const FIELD_PREFIX: &str = "stc";
const FIELD_SUFFIX: &str = "List";
const RECORD_TYPE_PREFIX: &str = "Cmd.Stc";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StcFormat {
    pub name: String,
    pub fields: Vec<String>,
}

/// Lowercase command name of a `Cmd.CmdDef` field: strips the leading
/// `stc` and trailing `List`, then lowercases the remainder.
pub fn command_name(field_name: &str) -> Result<String> {
    field_name
        .strip_prefix(FIELD_PREFIX)
        .and_then(|name| name.strip_suffix(FIELD_SUFFIX))
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
        .ok_or_else(|| Error::FieldName(field_name.to_string()))
}

/// Full name of the record type for a lowercase command name: `Cmd.Stc`
/// plus the name with its first character re-capitalized.
pub fn record_type_name(command: &str) -> String {
    let mut chars = command.chars();
    match chars.next() {
        Some(first) => format!("{RECORD_TYPE_PREFIX}{}{}", first.to_uppercase(), chars.as_str()),
        None => RECORD_TYPE_PREFIX.to_string(),
    }
}

/// One descriptor per enum field of the command-definition type, keyed by
/// command id. A missing root or record type, a field name not of the
/// `stc…List` form, or an enum field without a default value fails the
/// whole extraction; a partial descriptor set is never returned. Duplicate
/// ids overwrite, last seen wins.
pub fn extract(model: &TypeModel) -> Result<BTreeMap<i32, StcFormat>> {
    let root = model
        .get(COMMAND_DEF_TYPE)
        .ok_or_else(|| Error::TypeNotFound(COMMAND_DEF_TYPE.to_string()))?;

    let mut formats = BTreeMap::new();
    for field in root.fields.iter().filter(|field| field.is_enum) {
        let id = field
            .default_value
            .ok_or_else(|| Error::MissingDefault(field.name.clone()))?;
        let name = command_name(&field.name)?;
        let record_name = record_type_name(&name);
        let record = model
            .get(&record_name)
            .ok_or(Error::TypeNotFound(record_name))?;
        let fields = record
            .fields
            .iter()
            .filter(|field| field.is_public)
            .map(|field| field.name.clone())
            .collect();
        formats.insert(id, StcFormat { name, fields });
    }
    Ok(formats)
}
