//! # Document Loading
//!
//! Reads a contract document from disk and prepares it for compilation:
//! YAML or JSON by file extension, then every local `$ref` reachable from
//! `paths` is inlined so the compiler sees a fully-dereferenced tree.
//!
//! Only same-document pointers (`#/definitions/Pet`, `#/parameters/limit`)
//! are resolved. References to other files are rejected.

use std::collections::HashMap;
use std::path::Path;

use apiguard_core::{Document, ValueMap};
use serde_json::{Number, Value};
use thiserror::Error;

/// Nesting limit for inlined references. Recursive definitions hit it.
const MAX_REF_DEPTH: usize = 32;

/// Error loading or dereferencing a contract document.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or JSON.
    #[error("cannot parse '{path}': {reason}")]
    Parse { path: String, reason: String },

    /// A `$ref` points outside the document.
    #[error("unsupported reference '{0}': only local '#/...' pointers are resolved")]
    ExternalReference(String),

    /// A local `$ref` points at nothing.
    #[error("unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// Inlining did not terminate within the nesting limit.
    #[error(
        "reference '{0}' nests deeper than {max} levels; recursive definitions cannot be inlined",
        max = MAX_REF_DEPTH
    )]
    RecursiveReference(String),

    /// The dereferenced tree is not a contract document.
    #[error(transparent)]
    Document(#[from] apiguard_core::DocumentError),
}

/// Load, dereference and deserialize the document at `path`.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let raw = read_value(path)?;
    Ok(Document::try_from(inline_paths(raw)?)?)
}

/// Read a YAML (`.yaml`, `.yml`) or JSON file into a JSON value tree.
pub fn read_value(path: &Path) -> Result<Value, LoadError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: display.clone(),
        source,
    })?;
    let parse_error = |reason: String| LoadError::Parse {
        path: display.clone(),
        reason,
    };

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| parse_error(format!("invalid YAML: {e}")))?;
            yaml_into_json(yaml, "").map_err(parse_error)
        }
        _ => serde_json::from_str(&content).map_err(|e| parse_error(format!("invalid JSON: {e}"))),
    }
}

/// Replace every `{"$ref": "#/..."}` object under the document's `paths`
/// with the value it points to, recursively.
///
/// Targets are looked up anywhere in the document, but only what `paths`
/// reaches is inlined, so unused recursive definitions are harmless.
pub fn inline_paths(mut document: Value) -> Result<Value, LoadError> {
    let Some(paths) = document.get("paths") else {
        return Ok(document);
    };
    let inlined = Inliner::new(&document).inline(paths, 0)?;
    document["paths"] = inlined;
    Ok(document)
}

/// Resolves local references against one document, each at most once.
struct Inliner<'r> {
    root: &'r Value,
    resolved: HashMap<String, Value>,
}

impl<'r> Inliner<'r> {
    fn new(root: &'r Value) -> Self {
        Self {
            root,
            resolved: HashMap::new(),
        }
    }

    fn inline(&mut self, value: &Value, depth: usize) -> Result<Value, LoadError> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.resolve(reference, depth);
                }
                let mut inlined = ValueMap::with_capacity(map.len());
                for (key, child) in map {
                    inlined.insert(key.clone(), self.inline(child, depth)?);
                }
                Ok(Value::Object(inlined))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.inline(item, depth))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve(&mut self, reference: &str, depth: usize) -> Result<Value, LoadError> {
        if let Some(done) = self.resolved.get(reference) {
            return Ok(done.clone());
        }
        if depth >= MAX_REF_DEPTH {
            return Err(LoadError::RecursiveReference(reference.to_string()));
        }
        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| LoadError::ExternalReference(reference.to_string()))?;
        let target = self
            .root
            .pointer(pointer)
            .ok_or_else(|| LoadError::UnresolvedReference(reference.to_string()))?;
        let inlined = self.inline(target, depth + 1)?;
        self.resolved.insert(reference.to_string(), inlined.clone());
        Ok(inlined)
    }
}

/// Convert parsed YAML into JSON. `at` is the JSON Pointer of `yaml`
/// within the document and prefixes error messages.
///
/// Status codes are usually written as bare integers (`200:`), so scalar
/// mapping keys become strings.
fn yaml_into_json(yaml: serde_yaml::Value, at: &str) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            yaml_number(&n).ok_or_else(|| format!("{at}: number {n} has no JSON representation"))?
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| yaml_into_json(item, &format!("{at}/{i}")))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut object = ValueMap::with_capacity(map.len());
            for (key, value) in map {
                let key = mapping_key(key)
                    .map_err(|key| format!("{at}: mapping key {key:?} is not a scalar"))?;
                let child = yaml_into_json(value, &format!("{at}/{}", pointer_token(&key)))?;
                object.insert(key, child);
            }
            Value::Object(object)
        }
        // Tags carry no meaning in contract documents.
        Yaml::Tagged(tagged) => yaml_into_json(tagged.value, at)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        Some(Value::from(i))
    } else if let Some(u) = n.as_u64() {
        Some(Value::from(u))
    } else {
        n.as_f64().and_then(Number::from_f64).map(Value::Number)
    }
}

fn mapping_key(key: serde_yaml::Value) -> Result<String, serde_yaml::Value> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(other),
    }
}

fn pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
