use std::time::Duration;

use lektion_core::SourceText;
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Lektion".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "German reading lessons from articles and PDFs\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print timing information, colored by how long the step took.
///
/// Network steps are measured in seconds, so the thresholds are generous.
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);
    if ms < 1000.0 {
        eprintln!("  {} {:>10.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 10_000.0 {
        eprintln!("  {} {:>10.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>10.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Print what was gathered from the source
pub fn print_source_details(text: &SourceText) {
    let content = &text.extraction.content;
    let paragraphs = content.split("\n\n").filter(|p| !p.trim().is_empty()).count();

    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Source".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "From:".dimmed(), text.source_url.bright_white());
    eprintln!("  {} {}", "Title:".dimmed(), text.extraction.title.bright_white());
    eprintln!("  {} {}", "Characters:".dimmed(), text.extraction.content_chars().to_string().bright_white());
    eprintln!("  {} {}", "Words:".dimmed(), text.extraction.word_count().to_string().bright_white());
    eprintln!("  {} {}\n", "Paragraphs:".dimmed(), paragraphs.to_string().bright_white());
}

/// Print timing summary
pub fn print_timing_summary(total: Duration, timings: &[(String, Duration)]) {
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Timing Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    for (label, duration) in timings {
        print_timing(label, *duration);
    }

    eprintln!("  {} {:>10.2}ms\n", "Total:".bold().dimmed(), total.as_secs_f64() * 1000.0);
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
