use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Cancelling,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "PENDING",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
            RunStatus::Cancelled => "CANCELLED",
            RunStatus::Cancelling => "CANCELLING",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RunStatus::Pending | RunStatus::Running | RunStatus::Cancelling)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(RunStatus::Pending),
            "RUNNING" => Ok(RunStatus::Running),
            "COMPLETED" => Ok(RunStatus::Completed),
            "FAILED" => Ok(RunStatus::Failed),
            "CANCELLED" => Ok(RunStatus::Cancelled),
            "CANCELLING" => Ok(RunStatus::Cancelling),
            other => Err(format!("unknown run status: {}", other)),
        }
    }
}

/// Body of the training start call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRunRequest {
    pub training_execution_name: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub hyperparameters: Map<String, Value>,
    pub prefect_parameters: Map<String, Value>,
    pub training_data_preparation_ids: Vec<String>,
    #[serde(default)]
    pub base_model_artifact_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRunCreated {
    pub training_execution_id: String,
    pub training_execution_name: String,
    pub status: RunStatus,
}

/// Summary row of a training execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRun {
    pub training_execution_id: String,
    pub training_execution_name: String,
    pub status: RunStatus,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: String,
}

/// Query filters for listing training runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFilters {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub created_by: Vec<String>,
    #[serde(default)]
    pub tenant_id: Vec<String>,
    #[serde(default)]
    pub status: Option<RunStatus>,
    #[serde(default)]
    pub training_execution_name: Option<String>,
}

impl RunFilters {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = &self.start_date {
            pairs.push(("start_date".into(), start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("end_date".into(), end.clone()));
        }
        for id in &self.created_by {
            pairs.push(("created_by".into(), id.clone()));
        }
        for id in &self.tenant_id {
            pairs.push(("tenant_id".into(), id.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".into(), status.as_str().to_string()));
        }
        if let Some(name) = &self.training_execution_name {
            pairs.push(("training_execution_name".into(), name.clone()));
        }
        pairs
    }

    /// Applies the filters locally, the way the fixture backend answers.
    pub fn matches(&self, run: &TrainingRun) -> bool {
        if let Some(status) = self.status {
            if run.status != status {
                return false;
            }
        }
        if !self.tenant_id.is_empty() {
            match &run.tenant_id {
                Some(t) if self.tenant_id.contains(t) => {}
                _ => return false,
            }
        }
        if let Some(name) = &self.training_execution_name {
            if !run
                .training_execution_name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        let started = run.started_at.as_deref().unwrap_or(&run.created_at);
        let started_day = started.get(..10).unwrap_or(started);
        if let Some(start) = &self.start_date {
            if started_day < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if started_day > end.as_str() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(status: RunStatus, tenant: &str, started: &str) -> TrainingRun {
        TrainingRun {
            training_execution_id: "train_1".into(),
            training_execution_name: "Customer A ASR v2".into(),
            status,
            customer_name: None,
            tenant_id: Some(tenant.into()),
            started_at: Some(started.into()),
            completed_at: None,
            error_message: None,
            created_at: started.into(),
        }
    }

    #[test]
    fn end_date_is_inclusive_of_the_whole_day() {
        let filters = RunFilters {
            end_date: Some("2025-01-15".into()),
            ..Default::default()
        };
        assert!(filters.matches(&run(RunStatus::Running, "t1", "2025-01-15T23:59:00Z")));
        assert!(!filters.matches(&run(RunStatus::Running, "t1", "2025-01-16T00:00:01Z")));
    }

    #[test]
    fn query_pairs_repeat_multi_valued_keys() {
        let filters = RunFilters {
            tenant_id: vec!["a".into(), "b".into()],
            status: Some(RunStatus::Failed),
            ..Default::default()
        };
        let pairs = filters.to_query_pairs();
        assert_eq!(pairs.iter().filter(|(k, _)| k == "tenant_id").count(), 2);
        assert!(pairs.contains(&("status".to_string(), "FAILED".to_string())));
    }
}
