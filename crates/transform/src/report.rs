//! Markdown rendering of validation summaries

use crate::templates::{self, VALIDATION_REPORT};
use crate::validate::{CombinedReport, ServiceReport, ValidationSummary};
use chrono::Utc;
use postman_forge_common::{ForgeError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::Context;
use tracing::info;

#[derive(Serialize)]
struct ServiceView<'a> {
    #[serde(flatten)]
    report: &'a ServiceReport,
    warning_messages: Vec<String>,
}

#[derive(Serialize)]
struct SummaryView<'a> {
    passed: bool,
    services: Vec<ServiceView<'a>>,
    combined: &'a CombinedReport,
}

/// Render a validation summary as a Markdown document
pub fn render_markdown(summary: &ValidationSummary) -> Result<String> {
    let tera = templates::load_templates()?;

    let view = SummaryView {
        passed: summary.passed,
        services: summary
            .services
            .iter()
            .map(|report| ServiceView {
                report,
                warning_messages: report.warnings.iter().map(ToString::to_string).collect(),
            })
            .collect(),
        combined: &summary.combined,
    };

    let mut context = Context::new();
    context.insert(
        "generated_at",
        &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    context.insert("summary", &view);

    tera.render(VALIDATION_REPORT, &context)
        .map_err(|e| ForgeError::Template(format!("Failed to render validation report: {:?}", e)))
}

/// Render a validation summary and write it to `path`
pub fn write_markdown(summary: &ValidationSummary, path: &Path) -> Result<()> {
    let rendered = render_markdown(summary)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;

    info!(path = %path.display(), "Validation report written");
    Ok(())
}
