use serde::{Deserialize, Serialize};

/// A customer tenant as exposed by the tenant-id mapping endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: String,
    pub tenant_name: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl Tenant {
    pub fn new(tenant_id: &str, tenant_name: &str, region: Option<&str>) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            tenant_name: tenant_name.to_string(),
            region: region.map(|r| r.to_string()),
        }
    }
}
