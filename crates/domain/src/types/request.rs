//! Request option types for job creation and auxiliary calls

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::DEFAULT_LIST_JOBS_LIMIT;

/// Options for creating a job.
///
/// `config` and `config_data` are overlaid on top of `body`, so they win
/// over keys of the same name supplied there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobOptions {
    /// Stored configuration id
    pub config: Option<Value>,
    /// Inline configuration data
    pub config_data: Option<Value>,
    /// Image tag to run, appended as `/tag/{tag}`
    pub tag: Option<String>,
    /// Base request body
    pub body: Map<String, Value>,
}

impl JobOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: impl Into<Value>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_config_data(mut self, data: impl Into<Value>) -> Self {
        self.config_data = Some(data.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_body_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Request body sent to the create endpoint.
    ///
    /// A `null` config or config data counts as unset and is not sent.
    pub fn request_body(&self) -> Map<String, Value> {
        let mut body = self.body.clone();
        if let Some(config) = self.config.as_ref().filter(|v| !v.is_null()) {
            body.insert("config".to_string(), config.clone());
        }
        if let Some(data) = self.config_data.as_ref().filter(|v| !v.is_null()) {
            body.insert("configData".to_string(), data.clone());
        }
        body
    }
}

/// Body of `POST docker/configuration/resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveConfigurationRequest {
    pub component_id: String,
    pub config_id: String,
    pub config_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_values_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variable_values_data: Map<String, Value>,
}

impl ResolveConfigurationRequest {
    pub fn new(
        component_id: impl Into<String>,
        config_id: impl Into<String>,
        config_version: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            config_id: config_id.into(),
            config_version: config_version.into(),
            variable_values_id: None,
            variable_values_data: Map::new(),
        }
    }

    pub fn with_variable_values_id(mut self, id: impl Into<String>) -> Self {
        self.variable_values_id = Some(id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    pub fn with_variable_values_data(mut self, data: Map<String, Value>) -> Self {
        self.variable_values_data = data;
        self
    }
}

/// Query for `GET queue/jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListJobsQuery {
    /// Search expression; empty matches everything
    pub q: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListJobsQuery {
    fn default() -> Self {
        Self { q: String::new(), limit: DEFAULT_LIST_JOBS_LIMIT, offset: 0 }
    }
}

impl ListJobsQuery {
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = q.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}
