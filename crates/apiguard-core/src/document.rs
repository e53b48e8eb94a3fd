//! # Contract Document Model
//!
//! Serde types for a fully-dereferenced Swagger 2.0 document, limited to
//! what route matching and conformance checking read. Unknown fields are
//! ignored on input so that richer documents deserialize unchanged.
//!
//! ## Parameter schemas
//!
//! Body parameters carry a free-form JSON Schema under `schema`. Every
//! other location describes its value inline with a [`SimpleSchema`]
//! (`type`, `format`, `items`, `collectionFormat` plus any further
//! JSON-Schema keywords such as `enum` or `minimum`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DocumentError, UnknownMethod};

/// Response key used when no entry is declared for the actual status code.
pub const DEFAULT_RESPONSE: &str = "default";

/// Root of a contract document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Dialect marker, `"2.0"` for Swagger documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// Prefix applied to every path template when matching.
    #[serde(rename = "basePath", default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Path templates such as `/pets/{petId}` mapped to their operations.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

impl Document {
    /// The base path prefix, or the empty string when none is declared.
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or("")
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(DocumentError::Shape)
    }
}

/// Document metadata. Carried through for display only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

/// HTTP methods a path item may declare an operation for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl Method {
    /// All methods, in declaration order.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
    ];

    /// Lowercase name as it appears in a path item.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = UnknownMethod;

    /// Parses a method name case-insensitively (`GET`, `get` and `Get` are
    /// equivalent).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// Operations declared for one path template, plus parameters shared by
/// all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// Parameters applying to every operation on this path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// The operation declared for `method`, if any.
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        match method {
            Method::Get => self.get.as_ref(),
            Method::Put => self.put.as_ref(),
            Method::Post => self.post.as_ref(),
            Method::Delete => self.delete.as_ref(),
            Method::Options => self.options.as_ref(),
            Method::Head => self.head.as_ref(),
            Method::Patch => self.patch.as_ref(),
        }
    }

    /// Every declared operation with its method.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        Method::ALL
            .into_iter()
            .filter_map(move |m| self.operation(m).map(|op| (m, op)))
    }
}

/// A single method on a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Status code (`"200"`) or `"default"` mapped to its response.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

impl Operation {
    /// Merge `shared` path-level parameters with this operation's own.
    ///
    /// Parameters are keyed by `(name, location)`. An operation-level entry
    /// replaces the path-level entry with the same key in place; new keys
    /// are appended in declaration order.
    pub fn resolved_parameters(&self, shared: &[Parameter]) -> Vec<Parameter> {
        let mut resolved: Vec<Parameter> = Vec::with_capacity(shared.len() + self.parameters.len());
        for parameter in shared.iter().chain(&self.parameters) {
            match resolved.iter_mut().find(|p| p.key() == parameter.key()) {
                Some(slot) => *slot = parameter.clone(),
                None => resolved.push(parameter.clone()),
            }
        }
        resolved
    }
}

/// Where a parameter's value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Query,
    Path,
    Body,
    Header,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Query => "query",
            Location::Path => "path",
            Location::Body => "body",
            Location::Header => "header",
        }
    }

    /// Query and header values arrive as strings and are coerced before
    /// structural validation.
    pub fn is_transport_string(&self) -> bool {
        matches!(self, Location::Query | Location::Header)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared operation input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: Location,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of a body parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Inline type description of a non-body parameter.
    #[serde(flatten)]
    pub simple: SimpleSchema,
}

impl Parameter {
    /// Identity of the parameter within an operation.
    pub fn key(&self) -> (&str, Location) {
        (self.name.as_str(), self.location)
    }

    /// The JSON Schema a value of this parameter must satisfy.
    ///
    /// Body parameters use their `schema` verbatim (an absent schema
    /// accepts anything). Other locations translate their inline
    /// description with [`SimpleSchema::to_json_schema`].
    pub fn json_schema(&self) -> Value {
        match self.location {
            Location::Body => self
                .schema
                .clone()
                .unwrap_or_else(|| Value::Object(Map::new())),
            _ => self.simple.to_json_schema(),
        }
    }
}

/// Swagger primitive and container types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// Multipart upload. Carries no structural constraint.
    File,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::Object => "object",
            DataType::File => "file",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Number | DataType::Integer)
    }
}

/// Delimiter convention for array values carried in a single string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionFormat {
    /// Comma separated.
    #[default]
    Csv,
    /// Space separated.
    Ssv,
    /// Tab separated.
    Tsv,
    /// Pipe separated.
    Pipes,
    /// Repeated keys; a lone string is one element.
    Multi,
    /// Any unrecognised format. Treated like `multi`.
    #[serde(other)]
    Other,
}

impl CollectionFormat {
    /// The element delimiter, or `None` when a single value is one element.
    pub fn delimiter(&self) -> Option<char> {
        match self {
            CollectionFormat::Csv => Some(','),
            CollectionFormat::Ssv => Some(' '),
            CollectionFormat::Tsv => Some('\t'),
            CollectionFormat::Pipes => Some('|'),
            CollectionFormat::Multi | CollectionFormat::Other => None,
        }
    }
}

/// Inline type description used by non-body parameters and their `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SimpleSchema>>,
    #[serde(rename = "collectionFormat", default, skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<CollectionFormat>,
    /// Remaining keywords (`enum`, `minimum`, `pattern`, ...), kept verbatim.
    #[serde(flatten)]
    pub keywords: Map<String, Value>,
}

/// Swagger-only keywords that have no JSON-Schema meaning.
const SWAGGER_ONLY_KEYWORDS: [&str; 2] = ["allowEmptyValue", "collectionFormat"];

impl SimpleSchema {
    /// Element type of an array description.
    pub fn item_type(&self) -> Option<DataType> {
        self.items.as_ref().and_then(|items| items.data_type)
    }

    /// Declared collection format, defaulting to comma separated.
    pub fn collection_format(&self) -> CollectionFormat {
        self.collection_format.unwrap_or_default()
    }

    /// Translate into a JSON Schema object.
    ///
    /// `type: file` is dropped, as are vendor extensions (`x-*`) and
    /// keywords with no JSON-Schema counterpart.
    pub fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();
        if let Some(data_type) = self.data_type.filter(|t| *t != DataType::File) {
            schema.insert("type".into(), Value::String(data_type.as_str().into()));
        }
        if let Some(format) = &self.format {
            schema.insert("format".into(), Value::String(format.clone()));
        }
        if let Some(items) = &self.items {
            schema.insert("items".into(), items.to_json_schema());
        }
        for (keyword, value) in &self.keywords {
            if keyword.starts_with("x-") || SWAGGER_ONLY_KEYWORDS.contains(&keyword.as_str()) {
                continue;
            }
            schema.insert(keyword.clone(), value.clone());
        }
        Value::Object(schema)
    }
}

/// A declared response for one status code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    /// Body schema. `None` means no body is permitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub headers: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn petstore() -> Document {
        Document::try_from(json!({
            "swagger": "2.0",
            "info": {"title": "Swagger Petstore", "version": "1.0.0"},
            "basePath": "/v1",
            "paths": {
                "/pets/{petId}": {
                    "parameters": [
                        {"name": "petId", "in": "path", "required": true, "type": "string"},
                        {"name": "verbose", "in": "query", "type": "boolean"}
                    ],
                    "get": {
                        "summary": "Info for a specific pet",
                        "parameters": [
                            {"name": "verbose", "in": "query", "type": "integer", "format": "int32"},
                            {"name": "If-Match", "in": "header", "required": true, "type": "string"}
                        ],
                        "responses": {
                            "200": {"description": "ok", "schema": {"type": "object"}},
                            "default": {"description": "unexpected error"}
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_petstore_shape() {
        let doc = petstore();
        assert_eq!(doc.base_path(), "/v1");
        let item = &doc.paths["/pets/{petId}"];
        let get = item.operation(Method::Get).unwrap();
        assert_eq!(get.summary.as_deref(), Some("Info for a specific pet"));
        assert!(item.operation(Method::Post).is_none());
        assert_eq!(get.responses.len(), 2);
        assert!(get.responses[DEFAULT_RESPONSE].schema.is_none());
    }

    #[test]
    fn test_missing_base_path_is_empty() {
        let doc = Document::try_from(json!({"paths": {}})).unwrap();
        assert_eq!(doc.base_path(), "");
    }

    #[test]
    fn test_operation_parameters_replace_path_parameters() {
        let doc = petstore();
        let item = &doc.paths["/pets/{petId}"];
        let resolved = item.get.as_ref().unwrap().resolved_parameters(&item.parameters);

        let keys: Vec<_> = resolved.iter().map(Parameter::key).collect();
        assert_eq!(
            keys,
            vec![
                ("petId", Location::Path),
                ("verbose", Location::Query),
                ("If-Match", Location::Header),
            ]
        );
        // The operation-level declaration wins.
        assert_eq!(resolved[1].simple.data_type, Some(DataType::Integer));
    }

    #[test]
    fn test_same_name_different_location_are_distinct() {
        let shared: Vec<Parameter> = serde_json::from_value(json!([
            {"name": "id", "in": "path", "required": true, "type": "string"}
        ]))
        .unwrap();
        let op: Operation = serde_json::from_value(json!({
            "parameters": [{"name": "id", "in": "query", "type": "integer"}],
            "responses": {}
        }))
        .unwrap();
        assert_eq!(op.resolved_parameters(&shared).len(), 2);
    }

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Patch".parse::<Method>().unwrap(), Method::Patch);
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn test_collection_format_parsing() {
        let formats: Vec<CollectionFormat> =
            serde_json::from_value(json!(["csv", "ssv", "tsv", "pipes", "multi", "bogus"])).unwrap();
        let delimiters: Vec<_> = formats.iter().map(CollectionFormat::delimiter).collect();
        assert_eq!(
            delimiters,
            vec![Some(','), Some(' '), Some('\t'), Some('|'), None, None]
        );
        assert_eq!(SimpleSchema::default().collection_format(), CollectionFormat::Csv);
    }

    #[test]
    fn test_simple_schema_to_json_schema() {
        let parameter: Parameter = serde_json::from_value(json!({
            "name": "tags",
            "in": "query",
            "type": "array",
            "collectionFormat": "pipes",
            "items": {"type": "integer", "minimum": 1},
            "maxItems": 3,
            "allowEmptyValue": true,
            "x-internal": true
        }))
        .unwrap();
        assert_eq!(parameter.simple.item_type(), Some(DataType::Integer));
        assert_eq!(
            parameter.json_schema(),
            json!({
                "type": "array",
                "items": {"type": "integer", "minimum": 1},
                "maxItems": 3
            })
        );
    }

    #[test]
    fn test_file_type_is_unconstrained() {
        let parameter: Parameter =
            serde_json::from_value(json!({"name": "upload", "in": "header", "type": "file"})).unwrap();
        assert_eq!(parameter.json_schema(), json!({}));
    }

    #[test]
    fn test_body_parameter_uses_schema() {
        let parameter: Parameter = serde_json::from_value(json!({
            "name": "pet",
            "in": "body",
            "required": true,
            "schema": {"type": "object", "required": ["name"]}
        }))
        .unwrap();
        assert!(parameter.required);
        assert_eq!(
            parameter.json_schema(),
            json!({"type": "object", "required": ["name"]})
        );
    }

    #[test]
    fn test_unknown_location_is_rejected() {
        let err = Document::try_from(json!({
            "paths": {"/x": {"get": {
                "parameters": [{"name": "a", "in": "cookie"}],
                "responses": {}
            }}}
        }))
        .unwrap_err();
        assert!(matches!(err, DocumentError::Shape(_)));
    }
}
