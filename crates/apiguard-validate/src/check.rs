//! # Field Checks
//!
//! Precompiled predicates attached to every parameter and response at
//! compile time. A check owns its compiled JSON-Schema validator and is
//! invoked by reference for every request; nothing here is mutated after
//! construction.
//!
//! ## Thread Safety
//!
//! `jsonschema::Validator` is `Send + Sync`, so compiled checks can be
//! shared across threads without synchronization.

use std::fmt;

use apiguard_core::SimpleSchema;
use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::coerce::coerce;

/// A JSON Schema paired with its compiled validator.
pub struct CompiledSchema {
    schema: Value,
    validator: Validator,
}

impl CompiledSchema {
    /// Compile `schema` under Draft 4, the dialect Swagger 2.0 builds on.
    ///
    /// # Errors
    ///
    /// Returns the schema compiler's message if `schema` is not a valid
    /// JSON Schema.
    pub fn compile(schema: Value) -> Result<Self, String> {
        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft4);
        let validator = opts.build(&schema).map_err(|e| e.to_string())?;
        Ok(Self { schema, validator })
    }

    /// The schema this validator was built from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// How a value is judged against its declaration.
#[derive(Debug)]
pub enum FieldCheck {
    /// Structural validation of an already-typed value (path, body and
    /// response values).
    Strict {
        required: bool,
        schema: CompiledSchema,
    },
    /// Query and header values: coerce the transport string to the
    /// declared type, then validate structurally.
    Coercing {
        required: bool,
        declared: SimpleSchema,
        schema: CompiledSchema,
    },
    /// The value must be absent, null or the empty string.
    Empty,
}

impl FieldCheck {
    /// Whether `value` conforms. `None` means the value was not supplied.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match self {
            FieldCheck::Strict { required, schema } => match value {
                None => !required,
                Some(value) => schema.is_valid(value),
            },
            FieldCheck::Coercing {
                required,
                declared,
                schema,
            } => match value {
                None => !required,
                Some(value) => schema.is_valid(&coerce(value, declared)),
            },
            FieldCheck::Empty => is_empty_body(value),
        }
    }
}

/// Absent, `null` and `""` all count as "no body".
pub fn is_empty_body(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn simple(value: Value) -> SimpleSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_body_rule() {
        assert!(is_empty_body(None));
        assert!(is_empty_body(Some(&Value::Null)));
        assert!(is_empty_body(Some(&json!(""))));
        assert!(!is_empty_body(Some(&json!(" "))));
        assert!(!is_empty_body(Some(&json!({}))));
        assert!(!is_empty_body(Some(&json!(0))));
    }

    #[test]
    fn test_strict_check_does_not_coerce() {
        let check = FieldCheck::Strict {
            required: true,
            schema: CompiledSchema::compile(json!({"type": "integer"})).unwrap(),
        };
        assert!(check.accepts(Some(&json!(5))));
        assert!(!check.accepts(Some(&json!("5"))));
        assert!(!check.accepts(None));
    }

    #[test]
    fn test_optional_absent_value_is_accepted() {
        let declared = simple(json!({"type": "integer"}));
        let check = FieldCheck::Coercing {
            required: false,
            schema: CompiledSchema::compile(declared.to_json_schema()).unwrap(),
            declared,
        };
        assert!(check.accepts(None));
        assert!(check.accepts(Some(&json!("12"))));
        assert!(!check.accepts(Some(&json!("twelve"))));
    }

    #[test]
    fn test_required_absent_value_is_rejected() {
        let declared = simple(json!({"type": "string"}));
        let check = FieldCheck::Coercing {
            required: true,
            schema: CompiledSchema::compile(declared.to_json_schema()).unwrap(),
            declared,
        };
        assert!(!check.accepts(None));
        assert!(check.accepts(Some(&json!("XYZ"))));
    }

    #[test]
    fn test_keywords_are_enforced() {
        let declared = simple(json!({"type": "integer", "minimum": 1, "maximum": 100}));
        let check = FieldCheck::Coercing {
            required: false,
            schema: CompiledSchema::compile(declared.to_json_schema()).unwrap(),
            declared,
        };
        assert!(check.accepts(Some(&json!("50"))));
        assert!(!check.accepts(Some(&json!("0"))));
        assert!(!check.accepts(Some(&json!("101"))));
    }

    #[test]
    fn test_invalid_schema_is_reported() {
        let err = CompiledSchema::compile(json!({"type": 12})).unwrap_err();
        assert!(!err.is_empty());
    }
}
