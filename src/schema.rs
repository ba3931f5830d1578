// src/schema.rs
//
// Response contracts declared once: the same tree is sent to the generative
// service as its response-shape constraint and used to check what comes back.
use crate::errors::CreatorError;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy)]
pub enum Kind {
    String,
    Number,
    StringArray,
    Object(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
}

const fn field(name: &'static str, kind: Kind) -> Field {
    Field { name, kind }
}

static VISUAL_BALANCE: [Field; 5] = [
    field("vibrancy", Kind::Number),
    field("minimalism", Kind::Number),
    field("complexity", Kind::Number),
    field("softness", Kind::Number),
    field("futurism", Kind::Number),
];

static TONE_MANNER: [Field; 2] = [
    field("temperature", Kind::String),
    field("dynamism", Kind::String),
];

static TEXTURE_DENSITY: [Field; 3] = [
    field("reflectivity", Kind::Number),
    field("transparency", Kind::Number),
    field("roughness", Kind::Number),
];

static INSIGHT: [Field; 4] = [
    field("visual_balance", Kind::Object(&VISUAL_BALANCE)),
    field("tone_manner", Kind::Object(&TONE_MANNER)),
    field("texture_density", Kind::Object(&TEXTURE_DENSITY)),
    field("designer_comment", Kind::String),
];

pub static GENERATION_SCHEMA: [Field; 5] = [
    field("midjourney", Kind::String),
    field("dalle", Kind::String),
    field("stableDiffusion", Kind::String),
    field("designIntent", Kind::String),
    field("insight", Kind::Object(&INSIGHT)),
];

pub static ANALYSIS_SCHEMA: [Field; 7] = [
    field("camera", Kind::String),
    field("ratio", Kind::String),
    field("artStyle", Kind::String),
    field("texture", Kind::String),
    field("lighting", Kind::String),
    field("bgColors", Kind::StringArray),
    field("objColors", Kind::StringArray),
];

/// Renders the tree in the service's response-schema dialect, with every
/// property required.
pub fn to_response_schema(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    for f in fields {
        properties.insert(f.name.to_string(), kind_schema(&f.kind));
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields.iter().map(|f| f.name).collect::<Vec<_>>(),
    })
}

fn kind_schema(kind: &Kind) -> Value {
    match kind {
        Kind::String => json!({ "type": "STRING" }),
        Kind::Number => json!({ "type": "NUMBER" }),
        Kind::StringArray => json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
        Kind::Object(fields) => to_response_schema(fields),
    }
}

/// Walks `value` against `fields` depth-first in declaration order and fails
/// on the first field that is missing or of the wrong type. Unknown extra
/// fields are ignored.
pub fn check(value: &Value, fields: &[Field]) -> Result<(), CreatorError> {
    let object = value
        .as_object()
        .ok_or_else(|| CreatorError::schema("<root>"))?;
    check_object(object, fields, "")
}

fn check_object(
    object: &Map<String, Value>,
    fields: &[Field],
    prefix: &str,
) -> Result<(), CreatorError> {
    for f in fields {
        let path = if prefix.is_empty() {
            f.name.to_string()
        } else {
            format!("{}.{}", prefix, f.name)
        };

        let value = object
            .get(f.name)
            .ok_or_else(|| CreatorError::schema(path.as_str()))?;

        match (&f.kind, value) {
            (Kind::String, Value::String(_)) | (Kind::Number, Value::Number(_)) => {}
            (Kind::StringArray, Value::Array(items)) => {
                if let Some(i) = items.iter().position(|item| !item.is_string()) {
                    return Err(CreatorError::schema(format!("{}[{}]", path, i)));
                }
            }
            (Kind::Object(nested), Value::Object(inner)) => check_object(inner, nested, &path)?,
            _ => return Err(CreatorError::schema(path)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_field(err: CreatorError) -> String {
        match err {
            CreatorError::Schema { field } => field,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn response_schema_marks_every_field_required() {
        let schema = to_response_schema(&GENERATION_SCHEMA);
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(
            schema["required"],
            json!(["midjourney", "dalle", "stableDiffusion", "designIntent", "insight"])
        );
        let insight = &schema["properties"]["insight"]["properties"];
        assert_eq!(
            insight["tone_manner"]["required"],
            json!(["temperature", "dynamism"])
        );
        assert_eq!(
            insight["visual_balance"]["properties"]["futurism"],
            json!({ "type": "NUMBER" })
        );
    }

    #[test]
    fn analysis_schema_declares_color_arrays() {
        let schema = to_response_schema(&ANALYSIS_SCHEMA);
        assert_eq!(
            schema["properties"]["bgColors"],
            json!({ "type": "ARRAY", "items": { "type": "STRING" } })
        );
    }

    #[test]
    fn check_reports_nested_path() {
        let value = json!({
            "midjourney": "a", "dalle": "b", "stableDiffusion": "c", "designIntent": "d",
            "insight": {
                "visual_balance": {
                    "vibrancy": 1, "minimalism": 2, "complexity": 3, "softness": "4", "futurism": 5
                }
            }
        });
        let err = check(&value, &GENERATION_SCHEMA).unwrap_err();
        assert_eq!(schema_field(err), "insight.visual_balance.softness");
    }

    #[test]
    fn check_rejects_non_string_array_items() {
        let value = json!({
            "camera": "Isometric", "ratio": "1:1", "artStyle": "Line Art", "texture": "Matte",
            "lighting": "Day", "bgColors": ["#FFFFFF", 3], "objColors": []
        });
        let err = check(&value, &ANALYSIS_SCHEMA).unwrap_err();
        assert_eq!(schema_field(err), "bgColors[1]");
    }

    #[test]
    fn check_rejects_non_object_root() {
        let err = check(&json!(["midjourney"]), &GENERATION_SCHEMA).unwrap_err();
        assert_eq!(schema_field(err), "<root>");
    }

    #[test]
    fn null_counts_as_mistyped() {
        let value = json!({ "midjourney": null });
        let err = check(&value, &GENERATION_SCHEMA).unwrap_err();
        assert_eq!(schema_field(err), "midjourney");
    }
}
