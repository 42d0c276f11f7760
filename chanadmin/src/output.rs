//! Rendering of admin API responses for the terminal

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// `Status: <code>` followed by the body re-indented with tabs
pub fn response_output(status: u16, body: &[u8]) -> String {
    let mut output = format!("Status: {}\n", status);
    if body.iter().all(u8::is_ascii_whitespace) {
        return output;
    }

    match serde_json::from_slice::<Value>(body).and_then(|value| indent(&value)) {
        Ok(indented) => output.push_str(&indented),
        Err(_) => output.push_str(String::from_utf8_lossy(body).trim_end()),
    }
    output.push('\n');
    output
}

/// `Error: <reason>` including every underlying cause
pub fn error_output(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    format!("Error: {}\n", message)
}

fn indent(value: &Value) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
