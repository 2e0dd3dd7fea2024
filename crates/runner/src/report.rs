//! Terminal report formatting

use colored::{ColoredString, Colorize};
use std::io::{self, Write};

use crate::dispatch::{HealthStatus, HttpResponse, PreparedRequest};
use crate::fixture::{EndpointTest, GroupSummary};
use crate::recorder::{Outcome, RunSummary, TestResult};

const HEADER_WIDTH: usize = 70;

/// Writes run output to any writer
pub struct Reporter<W: Write> {
    out: W,
    verbose: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(io::stdout(), verbose)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Centered title between two rules
    pub fn header(&mut self, text: &str) -> io::Result<()> {
        let rule = "=".repeat(HEADER_WIDTH);
        writeln!(self.out)?;
        writeln!(self.out, "{}", rule.cyan())?;
        writeln!(self.out, "{}", format!("{:^width$}", text, width = HEADER_WIDTH).cyan())?;
        writeln!(self.out, "{}", rule.cyan())?;
        writeln!(self.out)
    }

    /// One status line; the message follows when verbose or failed
    pub fn test_line(&mut self, result: &TestResult) -> io::Result<()> {
        self.status_line(&result.name, result.outcome, &result.message)
    }

    /// The health probe is shown like a test but never counted
    pub fn health(&mut self, status: &HealthStatus) -> io::Result<()> {
        let outcome = if status.is_healthy() { Outcome::Pass } else { Outcome::Fail };
        self.status_line("Health Check", outcome, status.message())
    }

    fn status_line(&mut self, name: &str, outcome: Outcome, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", paint(outcome, &format!("{} {}", glyph(outcome), name)))?;
        if !message.is_empty() && (self.verbose || outcome == Outcome::Fail) {
            writeln!(self.out, "  {}", message)?;
        }
        Ok(())
    }

    /// Request details printed before a verbose dispatch
    pub fn request_detail(
        &mut self,
        name: &str,
        test: &EndpointTest,
        prepared: &PreparedRequest,
    ) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        let request = serde_json::to_string_pretty(&test.request).unwrap_or_default();

        writeln!(self.out)?;
        writeln!(self.out, "{}", format!("Testing: {}", name).yellow())?;
        writeln!(self.out, "Description: {}", test.description)?;
        writeln!(self.out, "Method: {}", prepared.method)?;
        writeln!(self.out, "URL: {}", prepared.url)?;
        writeln!(self.out, "Request: {}", request)
    }

    pub fn response_body(&mut self, response: &HttpResponse) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        writeln!(self.out, "Response: {}", response.pretty_body())
    }

    pub fn group_not_found(&mut self, group: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "{}",
            format!("Error: Endpoint group '{}' not found", group).red()
        )
    }

    pub fn health_abort(&mut self, start_hint: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "Cannot proceed: API server is not running".red())?;
        writeln!(self.out, "{}", format!("Start the server with: {}", start_hint).yellow())
    }

    pub fn group_list(&mut self, groups: &[GroupSummary]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "Available Endpoint Groups:".cyan())?;
        for group in groups {
            writeln!(self.out, "  • {} ({} endpoints)", group.name, group.endpoints)?;
        }
        Ok(())
    }

    /// Totals, failures, success rate and banner
    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.header("Test Summary")?;

        writeln!(self.out, "Total Tests: {}", summary.total())?;
        writeln!(self.out, "{}", format!("Passed: {}", summary.passed()).green())?;
        writeln!(self.out, "{}", format!("Failed: {}", summary.failed()).red())?;

        if summary.failed() > 0 {
            writeln!(self.out)?;
            writeln!(self.out, "{}", "Failed Tests:".red())?;
            for failure in summary.failures() {
                writeln!(self.out, "  • {}", failure)?;
            }
        }

        if let Some(rate) = summary.success_rate() {
            writeln!(self.out)?;
            writeln!(self.out, "{}", format!("Success Rate: {:.1}%", rate).cyan())?;
            writeln!(self.out)?;
            writeln!(self.out, "{}", banner(rate))?;
        }
        Ok(())
    }
}

fn glyph(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "✓",
        Outcome::Fail => "✗",
        Outcome::Warn => "⚠",
    }
}

fn paint(outcome: Outcome, text: &str) -> ColoredString {
    match outcome {
        Outcome::Pass => text.green(),
        Outcome::Fail => text.red(),
        Outcome::Warn => text.yellow(),
    }
}

fn banner(rate: f64) -> ColoredString {
    if rate >= 100.0 {
        "🎉 All tests passed! Your API is working correctly.".green()
    } else if rate >= 80.0 {
        "⚠️  Most tests passed, but some endpoints need attention.".yellow()
    } else {
        "❌ Many tests failed. Check your API implementation.".red()
    }
}
