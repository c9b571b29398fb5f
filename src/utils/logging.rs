use serde::Serialize;
use serde_json::Value;

/// Pretty-prints `value` for a debug log line, with inline binary payloads
/// replaced by their length.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_value(value)
        .and_then(|mut json| {
            elide_inline_data(&mut json);
            serde_json::to_string_pretty(&json)
        })
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    log_action(pretty_json.as_str());
}

fn elide_inline_data(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "inlineData"
                    && let Some(Value::String(data)) = child.get_mut("data")
                {
                    *data = format!("<{} base64 chars elided>", data.len());
                    continue;
                }
                elide_inline_data(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(elide_inline_data),
        _ => {}
    }
}
