//! Run orchestration: list, single-group and full flows

use std::io::{self, Write};
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::dispatch::{classify, Dispatcher, HealthStatus};
use crate::error::RunnerResult;
use crate::fixture::{EndpointTest, Fixture};
use crate::recorder::{Outcome, RunSummary, TestResult};
use crate::report::Reporter;

/// Which flow a run follows. `--list` wins over a group filter, which wins
/// over a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    List,
    Group(String),
    Full,
}

impl Flow {
    pub fn select(list: bool, group: Option<String>) -> Self {
        match (list, group) {
            (true, _) => Flow::List,
            (false, Some(group)) => Flow::Group(group),
            (false, None) => Flow::Full,
        }
    }
}

/// How a flow ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Groups were listed, nothing was sent
    Listed,
    /// Tests ran and the summary was printed
    Completed,
    /// The full run stopped at a failed health check
    HealthGateClosed(HealthStatus),
}

/// Drives one run against one fixture. Counters live in this value only.
pub struct ApiRunner<W: Write> {
    config: RunnerConfig,
    fixture: Fixture,
    dispatcher: Dispatcher,
    reporter: Reporter<W>,
    summary: RunSummary,
}

impl ApiRunner<io::Stdout> {
    /// Load the configured fixture and report to stdout
    pub fn from_config(config: RunnerConfig) -> RunnerResult<Self> {
        let fixture = Fixture::load(&config.fixture)?;
        info!(
            "Loaded {} endpoint group(s), {} test(s) from {}",
            fixture.len(),
            fixture.test_count(),
            config.fixture.display()
        );
        let reporter = Reporter::stdout(config.verbose);
        Self::new(config, fixture, reporter)
    }
}

impl<W: Write> ApiRunner<W> {
    pub fn new(
        config: RunnerConfig,
        fixture: Fixture,
        reporter: Reporter<W>,
    ) -> RunnerResult<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::new(&config)?;
        Ok(Self {
            config,
            fixture,
            dispatcher,
            reporter,
            summary: RunSummary::new(),
        })
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_parts(self) -> (RunSummary, Reporter<W>) {
        (self.summary, self.reporter)
    }

    pub async fn execute(&mut self, flow: Flow) -> RunnerResult<FlowOutcome> {
        debug!(?flow, "starting flow");
        match flow {
            Flow::List => {
                self.list_groups()?;
                Ok(FlowOutcome::Listed)
            }
            Flow::Group(group) => self.run_single_group(&group).await,
            Flow::Full => self.run_all().await,
        }
    }

    /// Print group names with their endpoint counts
    pub fn list_groups(&mut self) -> RunnerResult<()> {
        self.reporter.group_list(&self.fixture.summaries())?;
        Ok(())
    }

    /// Probe the server and print the result. Not counted in the summary.
    pub async fn health_check(&mut self) -> RunnerResult<HealthStatus> {
        let status = self.dispatcher.health_check().await;
        if !status.is_healthy() {
            warn!("health check failed: {}", status.message());
        }
        self.reporter.health(&status)?;
        Ok(status)
    }

    /// Health check (informational), one group, summary
    pub async fn run_single_group(&mut self, group: &str) -> RunnerResult<FlowOutcome> {
        self.health_check().await?;
        self.run_group(group).await?;
        self.reporter.summary(&self.summary)?;
        Ok(FlowOutcome::Completed)
    }

    /// Health check gates the run; then every group in fixture order
    pub async fn run_all(&mut self) -> RunnerResult<FlowOutcome> {
        self.reporter.header("Backend API Tests")?;

        let health = self.health_check().await?;
        if !health.is_healthy() {
            self.reporter.health_abort(&self.config.start_hint)?;
            return Ok(FlowOutcome::HealthGateClosed(health));
        }

        let groups: Vec<String> = self.fixture.group_names().map(str::to_string).collect();
        for group in &groups {
            self.run_group(group).await?;
        }

        info!(
            passed = self.summary.passed(),
            failed = self.summary.failed(),
            "run finished"
        );
        self.reporter.summary(&self.summary)?;
        Ok(FlowOutcome::Completed)
    }

    /// Run every test of a group. Returns `false` when the group does not exist.
    pub async fn run_group(&mut self, group: &str) -> RunnerResult<bool> {
        let Some(tests) = self.fixture.group(group).cloned() else {
            self.reporter.group_not_found(group)?;
            return Ok(false);
        };

        info!("Testing group '{}' ({} endpoints)", group, tests.len());
        self.reporter.header(&format!("Testing {} Endpoints", group.to_uppercase()))?;

        for (name, test) in tests.tests() {
            self.run_test(&format!("{}.{}", group, name), test).await?;
        }

        Ok(true)
    }

    /// Dispatch one test, record it and print its line
    pub async fn run_test(&mut self, name: &str, test: &EndpointTest) -> RunnerResult<TestResult> {
        let mut shown_response = None;

        let (outcome, message) = match self.dispatcher.prepare(test) {
            Err(e) => (Outcome::Fail, e.to_string()),
            Ok(prepared) => {
                self.reporter.request_detail(name, test, &prepared)?;
                match self.dispatcher.send(&prepared, &test.request).await {
                    Ok(response) => match classify(&response) {
                        Ok(()) => {
                            let message = format!("Status: {}", response.status);
                            shown_response = Some(response);
                            (Outcome::Pass, message)
                        }
                        Err(e) => (Outcome::Fail, e.to_string()),
                    },
                    Err(e) => (Outcome::Fail, e.to_string()),
                }
            }
        };

        let result = self.summary.record(name, outcome, message).clone();
        self.reporter.test_line(&result)?;
        if let Some(response) = &shown_response {
            self.reporter.response_body(response)?;
        }

        Ok(result)
    }
}
