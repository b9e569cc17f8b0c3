use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CallError;

/// Reply envelope used by every backend command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KittyResponse<T = Value> {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> KittyResponse<T> {
    pub fn from_data(data: T) -> Self {
        Self {
            code: 0,
            msg: String::new(),
            data: Some(data),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl KittyResponse<Value> {
    pub fn failure(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }

    /// Unwrap a raw reply into its payload.
    ///
    /// Objects carrying a `code` field together with `data` or `msg` are treated
    /// as envelopes; anything else is returned unchanged as bare data.
    pub fn unwrap_payload(reply: Value) -> Result<Value, CallError> {
        if !Self::looks_like_envelope(&reply) {
            return Ok(reply);
        }

        let envelope: KittyResponse<Value> =
            serde_json::from_value(reply).map_err(|e| CallError::Decode(e.to_string()))?;

        if envelope.is_success() {
            Ok(envelope.data.unwrap_or(Value::Null))
        } else {
            Err(CallError::Backend {
                code: envelope.code,
                message: envelope.msg,
            })
        }
    }

    fn looks_like_envelope(reply: &Value) -> bool {
        match reply.as_object() {
            Some(obj) => {
                obj.get("code").is_some_and(Value::is_i64)
                    && (obj.contains_key("data") || obj.contains_key("msg"))
            }
            None => false,
        }
    }
}
