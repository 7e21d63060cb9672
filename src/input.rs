//! Reading configuration documents from files or stdin.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::io::{Read, stdin};
use std::path::Path;

/// Read `file` (or stdin when `None`) and split it into documents.
pub fn read_documents(file: Option<&Path>) -> Result<Vec<Value>> {
    let mut buf = String::new();
    if let Some(path) = file {
        buf = fs::read_to_string(path)
            .with_context(|| format!("reading input file {}", path.display()))?;
    } else {
        stdin()
            .read_to_string(&mut buf)
            .context("reading stdin for input JSON")?;
    }
    parse_documents(&buf)
}

/// Accepts a single object, an array of objects, or newline-delimited JSON.
pub fn parse_documents(input: &str) -> Result<Vec<Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("No input provided");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Array(items) => {
                if items.is_empty() {
                    bail!("Input array contains no configuration documents");
                }
                Ok(items)
            }
            Value::Object(_) => Ok(vec![value]),
            _ => bail!("Unsupported JSON input; expected object or array"),
        };
    }

    let mut documents = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("Unable to parse configuration from line {}", idx + 1))?;
        documents.push(value);
    }

    if documents.is_empty() {
        bail!("No configuration documents found in input stream");
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_is_one_document() {
        let docs = parse_documents(r#"{"api": {}, "auth": {}}"#).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn array_yields_elements() {
        let docs = parse_documents(r#"[{"api": {}}, {"auth": {}}]"#).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn ndjson_yields_each_line() {
        let docs = parse_documents("{\"api\": {}}\n\n{\"auth\": {}}\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn ndjson_error_names_line() {
        let err = parse_documents("{\"api\": {}}\n{oops\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn rejects_scalars_and_empty_input() {
        assert!(parse_documents("   ").is_err());
        assert!(parse_documents("42").is_err());
        assert!(parse_documents("[]").is_err());
    }
}
