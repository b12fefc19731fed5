//! JSON form files for the setup commands.
//!
//! A form file is a flat JSON object. Strings, numbers, booleans and string
//! arrays map to field values; `{"path": "..."}` picks a file to upload.

use crate::wizard::{Attachment, FieldValue, FormFields};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn load_form(path: &Path) -> Result<FormFields> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file: {:?}", path))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse form file: {:?}", path))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse_form(&value, base)
}

/// Attachment paths are relative to `base`.
pub(crate) fn parse_form(value: &Value, base: &Path) -> Result<FormFields> {
    let Value::Object(map) = value else {
        bail!("Form file must contain a JSON object");
    };

    let mut fields = FormFields::new();
    for (name, raw) in map {
        let field = match raw {
            Value::Null => continue,
            Value::Bool(b) => FieldValue::Flag(*b),
            Value::String(s) => FieldValue::Text(s.clone()),
            // Validators parse the text exactly as written
            Value::Number(n) => FieldValue::Text(n.to_string()),
            Value::Array(items) => {
                let list = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        Value::Number(n) => Ok(n.to_string()),
                        other => bail!("Field {name}: unsupported list item {other}"),
                    })
                    .collect::<Result<Vec<_>>>()?;
                FieldValue::List(list)
            }
            Value::Object(obj) => match obj.get("path").and_then(Value::as_str) {
                Some(rel) => FieldValue::Attachment(attachment(base, rel)?),
                None => bail!("Field {name}: objects must be {{\"path\": \"...\"}}"),
            },
        };
        fields.set(name.clone(), field);
    }
    Ok(fields)
}

fn attachment(base: &Path, rel: &str) -> Result<Attachment> {
    let path: PathBuf = base.join(rel);
    let meta =
        fs::metadata(&path).with_context(|| format!("Attachment not found: {:?}", path))?;
    if !meta.is_file() {
        bail!("Attachment is not a file: {:?}", path);
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| rel.to_string());
    Ok(Attachment {
        file_name,
        path,
        size: meta.len(),
    })
}
