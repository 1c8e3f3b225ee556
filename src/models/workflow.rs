use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: String,
    pub workflow_name: String,
}

impl Workflow {
    pub fn new(workflow_id: &str, workflow_name: &str) -> Self {
        Self {
            workflow_id: workflow_id.to_string(),
            workflow_name: workflow_name.to_string(),
        }
    }
}
