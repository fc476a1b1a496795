use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format.
/// Object `data` is merged into the JSON envelope.
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            match data {
                Some(Value::Object(fields)) => {
                    if let Some(obj) = response.as_object_mut() {
                        obj.extend(fields);
                    }
                }
                Some(other) => response["data"] = other,
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a failure in the appropriate format; text goes to stderr
pub fn output_error(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(data) = data {
                response["data"] = data;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("✗ {}", message);
        }
    }
    Ok(())
}

/// One `key: value` line per entry in text mode
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        println!("  {:<width$}  {}", key, value, width = width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_output_accepts_any_data_shape() {
        assert!(output_success(&OutputFormat::Json, "ok", Some(json!({ "count": 2 }))).is_ok());
        assert!(output_success(&OutputFormat::Json, "ok", Some(json!([1, 2]))).is_ok());
        assert!(output_error(&OutputFormat::Text, "failed", None).is_ok());
    }
}
