//! apiprobe endpoint runner
//!
//! Drives a declarative fixture of HTTP requests against a backend API and
//! reports pass/fail per endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ApiRunner                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fixture (JSON / YAML)                                      │
//! │    └── group -> name -> { endpoint, description,            │
//! │                           request, expected_response }      │
//! │  Dispatcher                                                 │
//! │    ├── prepare(test) -> PreparedRequest   (path params)     │
//! │    ├── send(prepared, payload) -> HttpResponse              │
//! │    └── health_check() -> HealthStatus                       │
//! │  RunSummary   record(name, outcome, message)                │
//! │  Reporter     headers, status lines, summary                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tests run strictly one after another; a failure is recorded and the run
//! moves on. Only fixture and configuration errors stop a run.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod fixture;
pub mod recorder;
pub mod report;
pub mod runner;

pub use config::RunnerConfig;
pub use dispatch::{Dispatcher, HealthStatus, HttpResponse, PreparedRequest};
pub use error::{DispatchError, RunnerError, RunnerResult};
pub use fixture::{EndpointGroup, EndpointTest, Fixture, GroupSummary};
pub use recorder::{Outcome, RunSummary, TestResult};
pub use report::Reporter;
pub use runner::{ApiRunner, Flow, FlowOutcome};
