//! Template loading and management

use postman_forge_common::{ForgeError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Name the validation report template is registered under
pub(crate) const VALIDATION_REPORT: &str = "validation_report.md";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("pass_fail", pass_fail_filter);
    tera.register_filter("md_escape", md_escape_filter);

    tera.add_raw_template(
        VALIDATION_REPORT,
        include_str!("../templates/validation_report.md.tera"),
    )
    .map_err(|e| {
        ForgeError::Template(format!("Failed to load {} template: {}", VALIDATION_REPORT, e))
    })?;

    Ok(tera)
}

/// Filter mapping a boolean to PASS / FAIL
fn pass_fail_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let passed = value
        .as_bool()
        .ok_or_else(|| tera::Error::msg("pass_fail filter expects a boolean"))?;

    Ok(Value::String(if passed { "PASS" } else { "FAIL" }.to_string()))
}

/// Filter escaping characters that would break a Markdown table cell
fn md_escape_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("md_escape filter expects a string"))?;

    Ok(Value::String(s.replace('|', "\\|").replace('\n', " ")))
}
