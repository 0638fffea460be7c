//! Issues command

use colored::Colorize;
use modgraph_core::{IssueSet, ModuleSession};

use crate::error::Result;

/// Run the issues command
pub fn run_issues(session: &ModuleSession, json: bool) -> Result<()> {
    let issues = session.issues();

    if json {
        println!("{}", serde_json::to_string_pretty(issues)?);
        return Ok(());
    }

    if issues.is_empty() {
        println!("{}", "No issues found".green());
        return Ok(());
    }

    let core_version = session
        .core()
        .and_then(|core| core.version.as_deref())
        .unwrap_or("unknown");
    print_report(issues, core_version);

    println!();
    println!("{} {} issue(s)", "Total:".dimmed(), issues.len());
    Ok(())
}

fn print_report(issues: &IssueSet, core_version: &str) {
    if !issues.dependency_versions.is_empty() {
        println!("{}:", "Version conflicts".yellow().bold());
        for issue in &issues.dependency_versions {
            println!(
                "  {} requested at {} but using {}",
                issue.requested.label().cyan(),
                issue.requested.path.as_str().dimmed(),
                issue.selected.label().green()
            );
        }
    }

    if !issues.missing_dependencies.is_empty() {
        println!("{}:", "Missing dependencies".yellow().bold());
        for name in &issues.missing_dependencies {
            println!("  {}", name.cyan());
        }
    }

    if !issues.missing_engine.is_empty() {
        println!("{}:", "Missing engine requirement".yellow().bold());
        for module in &issues.missing_engine {
            println!("  {} ({})", module.label().cyan(), module.path.as_str().dimmed());
        }
    }

    if !issues.incompatible_engine.is_empty() {
        println!("{}:", "Incompatible engine".red().bold());
        for module in &issues.incompatible_engine {
            println!(
                "  {} needs {} but core is {}",
                module.label().cyan(),
                module.engine_requirement.as_deref().unwrap_or("*"),
                core_version
            );
        }
    }
}
