use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Look up a json pointer, failing with a `Shape` error when the entry is
/// missing, or when it is not of the expected kind.
macro_rules! getter {
    ($json:expr, $to_get:expr, $extra:ident) => {{
        let tmp = getter!($json, $to_get)?;
        tmp.$extra().ok_or_else(|| {
            $crate::error::Error::Shape(format!(
                "failed to call `{}` on `{}` entry",
                stringify!($extra),
                $to_get,
            ))
        })
    }};
    ($json:expr, $to_get:expr) => {{
        $json
            .pointer(&$to_get)
            .ok_or_else(|| $crate::error::Error::Shape(format!("missing `{}` entry", $to_get)))
    }};
}

/// One hit of a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    pub fn new(raw: Value) -> Self {
        Document(raw)
    }

    /// The document identifier. Search engines return it as a string, but a
    /// numeric one is accepted too.
    pub fn id(&self) -> Result<String, Error> {
        match getter!(self.0, "/_id")? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(Error::Shape(format!("invalid `_id` entry: {}", other))),
        }
    }

    pub fn source(&self) -> Result<&Value, Error> {
        getter!(self.0, "/_source")
    }

    pub fn into_source(self) -> Result<Value, Error> {
        match self.0 {
            Value::Object(mut obj) => obj
                .remove("_source")
                .ok_or_else(|| Error::Shape("missing `/_source` entry".to_string())),
            _ => Err(Error::Shape("a document must be a json object".to_string())),
        }
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_numeric_ids() {
        let doc = Document::new(json!({"_id": "85922583", "_source": {}}));
        assert_eq!(doc.id().unwrap(), "85922583");
        let doc = Document::new(json!({"_id": 85922583, "_source": {}}));
        assert_eq!(doc.id().unwrap(), "85922583");
    }

    #[test]
    fn missing_fields_fail_loud() {
        let doc = Document::new(json!({"_type": "locality"}));
        assert!(doc.id().is_err());
        assert!(doc.source().is_err());
        assert!(doc.into_source().is_err());
    }

    #[test]
    fn source() {
        let doc = Document::new(json!({"_id": "1", "_source": {"wof:name": "Paris"}}));
        assert_eq!(doc.source().unwrap()["wof:name"], "Paris");
        assert_eq!(doc.into_source().unwrap(), json!({"wof:name": "Paris"}));
    }
}
