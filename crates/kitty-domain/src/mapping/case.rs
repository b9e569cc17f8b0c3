use serde_json::{Map, Value};

/// `http_port` -> `httpPort`, `delay-test url` -> `delayTestUrl`.
///
/// Numeric keys are returned unchanged and the first character is always
/// lower-cased, so `Host` becomes `host`.
pub fn camelize(key: &str) -> String {
    if key.parse::<f64>().is_ok() {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => out,
    }
}

/// `httpPort` -> `http_port`, `pinSHA256` -> `pin_sh_a256`.
pub fn decamelize(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_tail = chars
                .get(i + 1)
                .is_some_and(|n| n.is_ascii_lowercase() || n.is_ascii_digit());

            // lower/digit followed by upper starts a new word
            let word_start = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            // the last capital of an acronym starts a new word when a tail follows
            let acronym_end = prev.is_ascii_uppercase() && next_is_tail;

            if word_start || acronym_end {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Recursively camelize every object key inside `value`
pub fn camelize_keys(value: &Value) -> Value {
    convert_keys(value, &camelize)
}

/// Recursively decamelize every object key inside `value`
pub fn decamelize_keys(value: &Value) -> Value {
    convert_keys(value, &decamelize)
}

fn convert_keys(value: &Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(k, v)| (convert(k), convert_keys(v, convert)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| convert_keys(v, convert)).collect()),
        other => other.clone(),
    }
}
