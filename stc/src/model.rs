//! Reflected type model handed over by the host once metadata and binary
//! image are decrypted. Only the parts the format walk reads are carried:
//! type lookup by full name, declared fields in declaration order, and the
//! architecture tag of the binary the model came from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TypeModel {
    arch: String,
    types: HashMap<String, TypeDef>,
}

impl TypeModel {
    pub fn new(arch: impl Into<String>) -> Self {
        Self {
            arch: arch.into(),
            types: HashMap::new(),
        }
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn insert(&mut self, type_def: TypeDef) {
        self.types.insert(type_def.full_name.clone(), type_def);
    }

    pub fn get(&self, full_name: &str) -> Option<&TypeDef> {
        self.types.get(full_name)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TypeDef {
    pub full_name: String,
    /// Declared fields in declaration order.
    pub fields: Vec<FieldDef>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub is_public: bool,
    pub is_enum: bool,
    pub default_value: Option<i32>,
}
