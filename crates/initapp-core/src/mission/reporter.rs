//! Progress output for a running mission

use colored::Colorize;

/// Receives user-facing progress. Implementations must finish any animation in
/// `stop` so nothing outlives the step it decorates.
pub trait Reporter {
    fn start(&self, message: &str);
    fn stop(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Plain colored lines, one per event
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainReporter;

impl Reporter for PlainReporter {
    fn start(&self, message: &str) {
        println!("{} {}", "::".cyan().bold(), message);
    }

    fn stop(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    fn info(&self, message: &str) {
        println!("   {}", message.dimmed());
    }

    fn warn(&self, message: &str) {
        println!("{} {}", "!".yellow().bold(), message.yellow());
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn start(&self, _message: &str) {}
    fn stop(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}
