use serde::{Deserialize, Serialize};

use super::experiment::ExperimentSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddonMetadata {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub addon: AddonMetadata,
    pub installed: Vec<ExperimentSummary>,
}
