// Terminal UI utilities

use colored::Colorize;

use crate::domain::DeployReport;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

/// Summary of a push that went through, warnings included
pub fn print_report(app_name: &str, report: &DeployReport) {
    println!();
    println!(
        "{}",
        "════════════════════════════════════════════════════════════".bright_blue()
    );

    let steps: Vec<&str> = report.completed.iter().map(|s| s.name()).collect();
    print_info(&format!("Steps: {}", steps.join(" → ")));
    if let Some(venerable) = &report.venerable {
        print_info(&format!("Previous version: {}", venerable));
    }

    for warning in &report.warnings {
        print_warning(&warning.to_string());
    }

    if report.is_clean() {
        print_success(&format!("{} deployed without downtime", app_name));
    } else {
        print_success(&format!(
            "{} deployed with {} warning(s); check them above",
            app_name,
            report.warnings.len()
        ));
    }
}
