//! # Reference Bundling
//!
//! Turns a contract schema into a self-contained JSON Schema. Every local
//! `$ref` target is copied under the root `$defs` and the reference rewritten
//! to point there, so recursive schemas stay finite and the evaluator never has
//! to look outside the schema it was given.

use crate::contract::Schema;
use crate::pointer::{decode_pointer_segment, local_pointer, resolve_local_ref};
use crate::schema::subschemas_mut;
use derive_more::Display;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;

const DEFS: &str = "$defs";

/// A reference that could not be inlined.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// The reference points into another document.
    #[display("external reference '{_0}' cannot be resolved")]
    External(String),
    /// The pointer does not lead to a schema in this document.
    #[display("reference '{_0}' does not resolve to a schema")]
    Unresolved(String),
}

impl std::error::Error for BundleError {}

/// Produces a self-contained copy of `schema`.
pub fn bundle_schema(schema: &Schema) -> Result<Value, BundleError> {
    let mut root = schema.node().clone();

    let reserved = root
        .get(DEFS)
        .and_then(Value::as_object)
        .map(|defs| defs.keys().cloned().collect())
        .unwrap_or_default();
    let mut bundler = Bundler {
        document: schema.document(),
        keys: IndexMap::new(),
        taken: reserved,
        pending: Vec::new(),
        defs: Map::new(),
    };

    bundler.rewrite(&mut root)?;
    while let Some((key, mut target)) = bundler.pending.pop() {
        bundler.rewrite(&mut target)?;
        bundler.defs.insert(key, target);
    }

    if bundler.defs.is_empty() {
        return Ok(root);
    }

    if let Value::Object(map) = &mut root {
        let entry = map
            .entry(DEFS)
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(existing) => existing.extend(bundler.defs),
            other => *other = Value::Object(bundler.defs),
        }
    }
    Ok(root)
}

struct Bundler<'a> {
    document: &'a Value,
    /// Original reference -> key under `$defs`.
    keys: IndexMap<String, String>,
    taken: HashSet<String>,
    pending: Vec<(String, Value)>,
    defs: Map<String, Value>,
}

impl Bundler<'_> {
    fn rewrite(&mut self, value: &mut Value) -> Result<(), BundleError> {
        let Value::Object(map) = value else {
            return Ok(());
        };
        if let Some(Value::String(reference)) = map.get("$ref") {
            let key = self.def_key(&reference.clone())?;
            map.insert("$ref".to_string(), Value::String(format!("#/{DEFS}/{key}")));
        }
        for child in subschemas_mut(map) {
            self.rewrite(child)?;
        }
        Ok(())
    }

    fn def_key(&mut self, reference: &str) -> Result<String, BundleError> {
        if let Some(key) = self.keys.get(reference) {
            return Ok(key.clone());
        }

        let pointer = local_pointer(reference)
            .ok_or_else(|| BundleError::External(reference.to_string()))?;
        let target = resolve_local_ref(self.document, reference)
            .filter(|target| target.is_object() || target.is_boolean())
            .ok_or_else(|| BundleError::Unresolved(reference.to_string()))?;

        let key = self.allocate_key(pointer);
        self.keys.insert(reference.to_string(), key.clone());
        self.pending.push((key.clone(), target.clone()));
        Ok(key)
    }

    fn allocate_key(&mut self, pointer: &str) -> String {
        let base: String = pointer
            .trim_start_matches('/')
            .split('/')
            .map(decode_pointer_segment)
            .collect::<Vec<_>>()
            .join(".")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let mut key = base.clone();
        let mut suffix = 2;
        while !self.taken.insert(key.clone()) {
            key = format!("{base}_{suffix}");
            suffix += 1;
        }
        key
    }
}
