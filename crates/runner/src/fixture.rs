//! Declarative endpoint fixture
//!
//! A fixture maps endpoint groups to named endpoint tests:
//!
//! ```json
//! {
//!   "authentication": {
//!     "register": {
//!       "endpoint": "POST /api/auth/register",
//!       "description": "Register a new user",
//!       "request": { "email": "a@b.com" },
//!       "expected_response": { "user_id": "..." }
//!     }
//!   }
//! }
//! ```
//!
//! Documents ending in `.yaml` or `.yml` are read as YAML, anything else as JSON.
//! The schema is checked at load time so a bad document never reaches dispatch.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RunnerError, RunnerResult};

/// All endpoint groups, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixture {
    groups: IndexMap<String, EndpointGroup>,
}

/// Named endpoint tests belonging to one group, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointGroup {
    tests: IndexMap<String, EndpointTest>,
}

/// A single request definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointTest {
    /// Method and path, e.g. `GET /api/tests/{test_id}`
    pub endpoint: String,

    #[serde(default)]
    pub description: String,

    /// Path parameters, query parameters or JSON body depending on the method
    #[serde(default)]
    pub request: IndexMap<String, serde_json::Value>,

    /// Documentation only; responses are classified by status code
    #[serde(default)]
    pub expected_response: serde_json::Value,
}

/// Group name with its endpoint count, used by `--list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: String,
    pub endpoints: usize,
}

impl Fixture {
    /// Load a fixture, choosing the format from the file extension
    pub fn load(path: &Path) -> RunnerResult<Self> {
        if !path.exists() {
            return Err(RunnerError::FixtureNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);

        let parsed: Result<Self, String> = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| RunnerError::FixtureParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn group(&self, name: &str) -> Option<&EndpointGroup> {
        self.groups.get(name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of endpoint tests across all groups
    pub fn test_count(&self) -> usize {
        self.groups.values().map(EndpointGroup::len).sum()
    }

    pub fn summaries(&self) -> Vec<GroupSummary> {
        self.groups
            .iter()
            .map(|(name, group)| GroupSummary {
                name: name.clone(),
                endpoints: group.len(),
            })
            .collect()
    }
}

impl EndpointGroup {
    pub fn tests(&self) -> impl Iterator<Item = (&str, &EndpointTest)> {
        self.tests.iter().map(|(name, test)| (name.as_str(), test))
    }

    pub fn get(&self, name: &str) -> Option<&EndpointTest> {
        self.tests.get(name)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl EndpointTest {
    /// Build a test with no description or expected response
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            description: String::new(),
            request: IndexMap::new(),
            expected_response: serde_json::Value::Null,
        }
    }

    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.request.insert(key.into(), value.into());
        self
    }
}
