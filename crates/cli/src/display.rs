//! Console presentation of pipeline results

use colored::*;
use postman_forge_sync::{RemoteCollection, SyncAction, SyncOutcome, WorkspaceCheck};
use postman_forge_transform::{CombineSummary, CombinedReport, ServiceReport, ValidationSummary};

pub fn print_combine_summary(summary: &CombineSummary) {
    println!("\n{}", "Combined endpoints:".bold());
    for (service, count) in &summary.services {
        println!("  {}: {} endpoints", service.yellow(), count);
    }
    println!("  Total: {} endpoints", summary.total);
}

pub fn print_validation(summary: &ValidationSummary, verbose: bool) {
    for report in &summary.services {
        print_service_report(report, verbose);
    }
    print_combined_report(&summary.combined);

    println!("\n{}", "Validation Summary:".bold());
    for report in &summary.services {
        println!("  {}: {}", report.service, pass_fail(report.passed));
    }
    println!("  Combined: {}", pass_fail(summary.combined.passed));

    if summary.passed {
        println!("\n{}", "✓ All collections are valid!".green().bold());
    } else {
        println!("\n{}", "✗ Some collections have issues".red().bold());
    }
}

fn print_service_report(report: &ServiceReport, verbose: bool) {
    println!(
        "\n{} {}",
        "→".cyan(),
        format!("Validating {} collection", report.service).bold()
    );
    if let Some(source) = &report.source {
        println!("  File: {}", source);
    }

    if let Some(error) = &report.error {
        println!("  {} {}", "✗".red(), error);
        return;
    }

    println!(
        "  Collection: {}",
        report.collection_name.as_deref().unwrap_or("(unnamed)").yellow()
    );
    println!("  Schema: {}", report.schema.as_deref().unwrap_or("(none)"));
    match &report.base_url {
        Some(base_url) => println!("  {} baseUrl: {}", "✓".green(), base_url),
        None => println!("  {} baseUrl: (missing)", "⚠".yellow()),
    }
    println!("  Top-level items: {}", report.item_count);

    let shown = if verbose { report.endpoints.len() } else { report.endpoints.len().min(3) };
    for endpoint in &report.endpoints[..shown] {
        println!(
            "  • {} {} {}",
            endpoint.method.as_deref().unwrap_or("-").cyan(),
            endpoint.name,
            endpoint.url.dimmed()
        );
    }
    if shown < report.endpoints.len() {
        println!(
            "  … {} more (use --verbose to list all)",
            report.endpoints.len() - shown
        );
    }

    for warning in &report.warnings {
        println!("  {} {}", "⚠".yellow(), warning);
    }
}

fn print_combined_report(report: &CombinedReport) {
    println!(
        "\n{} {}",
        "→".cyan(),
        "Validating combined collection".bold()
    );
    if let Some(source) = &report.source {
        println!("  File: {}", source);
    }

    if let Some(error) = &report.error {
        println!("  {} {}", "✗".red(), error);
        return;
    }

    println!(
        "  Collection: {}",
        report.collection_name.as_deref().unwrap_or("(unnamed)").yellow()
    );
    println!(
        "  baseUrl: {}",
        report.base_url.as_deref().unwrap_or("(missing)")
    );
    for folder in &report.folders {
        println!(
            "  {} ({} endpoints)",
            folder.name.cyan(),
            folder.endpoints.len()
        );
    }
    println!("  Total endpoints: {}", report.total_endpoints);
}

fn pass_fail(passed: bool) -> ColoredString {
    if passed {
        "PASS".green()
    } else {
        "FAIL".red()
    }
}

pub fn print_sync_outcome(outcome: &SyncOutcome) {
    match &outcome.workspace {
        WorkspaceCheck::NotConfigured => {}
        WorkspaceCheck::Found { name } => println!(
            "{} Workspace found: {}",
            "✓".green(),
            name.as_deref().unwrap_or("(unnamed)")
        ),
        WorkspaceCheck::Failed { status } => {
            println!("{} Workspace check failed: {}", "⚠".yellow(), status)
        }
    }

    let action = match outcome.action {
        SyncAction::Updated => "Collection updated successfully",
        SyncAction::Created => "New collection created successfully",
    };
    println!("{} {}", "✓".green(), action);

    println!(
        "\n{}",
        "✓ Synchronization completed successfully!".green().bold()
    );
    println!("  Collection Name: {}", outcome.name.yellow());
    println!(
        "  Collection UID: {}",
        outcome.uid.as_deref().unwrap_or("(unknown)")
    );
    println!("  View in Postman: https://app.postman.com/");

    if outcome.persist_hint {
        if let Some(uid) = &outcome.uid {
            println!(
                "\n{}",
                "For future automated updates, set this environment variable:".bold()
            );
            println!("  POSTMAN_COLLECTION_UID={}", uid);
        }
    }
}

pub fn print_collections(collections: &[RemoteCollection]) {
    println!("{} Found {} collections:", "✓".green(), collections.len());
    for (index, collection) in collections.iter().enumerate() {
        println!(
            "  {}. {} (UID: {})",
            index + 1,
            collection.name,
            collection.uid
        );
    }
}
