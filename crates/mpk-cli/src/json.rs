/// Conversion between decoded [`Value`]s and JSON.
///
/// JSON has no binary, extension or non-string-key types, so those get a
/// tagged rendering on the way out:
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────┐
/// │ MessagePack          │ JSON                                         │
/// ├──────────────────────┼──────────────────────────────────────────────┤
/// │ nil                  │ null                                         │
/// │ uint / int           │ number                                       │
/// │ float (finite)       │ number                                       │
/// │ float (NaN, ±inf)    │ null                                         │
/// │ str                  │ string, decoded with the chosen encoding     │
/// │ bin                  │ {"$bin": "<hex>"}                            │
/// │ ext                  │ {"$ext": <type id>, "data": "<hex>"}         │
/// │ map                  │ object; non-string keys use display form     │
/// └──────────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// The reverse direction maps JSON numbers to the narrowest integer
/// variant, falling back to float64.
use anyhow::{Context, Result};
use mpk_types::{TextEncoding, Value};
use serde_json::{Map, Number, Value as Json};

/// Render `value` as JSON, decoding str payloads with `encoding`.
///
/// # Errors
///
/// Returns an error if a str payload is invalid in `encoding`.
pub fn to_json(value: &Value, encoding: TextEncoding) -> Result<Json> {
    Ok(match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::UInt(n) => Json::from(*n),
        Value::Int(n) => Json::from(*n),
        Value::F32(x) => float(f64::from(*x)),
        Value::F64(x) => float(*x),
        Value::Str(bytes) => Json::String(encoding.decode(bytes).context("undecodable string")?),
        Value::Bin(bytes) => {
            let mut tagged = Map::new();
            tagged.insert("$bin".to_string(), Json::String(hex::encode(bytes)));
            Json::Object(tagged)
        }
        Value::Ext { type_id, data } => {
            let mut tagged = Map::new();
            tagged.insert("$ext".to_string(), Json::from(*type_id));
            tagged.insert("data".to_string(), Json::String(hex::encode(data)));
            Json::Object(tagged)
        }
        Value::Array(items) => Json::Array(
            items
                .iter()
                .map(|item| to_json(item, encoding))
                .collect::<Result<_>>()?,
        ),
        Value::Map(entries) => {
            let mut object = Map::new();
            for (k, v) in entries {
                let key = match k {
                    Value::Str(bytes) => encoding.decode(bytes).context("undecodable map key")?,
                    other => other.to_string(),
                };
                object.insert(key, to_json(v, encoding)?);
            }
            Json::Object(object)
        }
    })
}

fn float(x: f64) -> Json {
    Number::from_f64(x).map_or(Json::Null, Json::Number)
}

/// Convert a JSON document into a [`Value`] tree.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else if let Some(i) = n.as_i64() {
                Value::integer(i)
            } else {
                Value::F64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        Json::Object(object) => Value::Map(
            object
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), from_json(v)))
                .collect(),
        ),
    }
}
