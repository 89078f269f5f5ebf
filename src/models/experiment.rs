use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::timestamps::serialize_api_datetime;

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Experiment {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub measurements_rendered: String,
    pub version: String,
    pub changelog_url: String,
    pub contribute_url: String,
    pub thumbnail: Option<String>,
    pub xpi_url: String,
    pub addon_id: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[sqlx(skip)]
    pub details: Vec<ExperimentDetail>,
    #[sqlx(skip)]
    pub contributors: Vec<ExperimentContributor>,
}

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct ExperimentDetail {
    pub experiment_id: i64,
    pub headline: String,
    pub image: Option<String>,
    pub copy: String,
}

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct ExperimentContributor {
    pub experiment_id: i64,
    pub display_name: String,
    pub title: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExperimentDetailSummary {
    pub headline: String,
    pub image: Option<String>,
    pub copy: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ContributorSummary {
    pub display_name: String,
    pub title: String,
}

/// Public representation of an experiment. `thumbnail` is always present in
/// the JSON, as `null` when the experiment has none.
#[derive(Debug, Serialize)]
pub struct ExperimentSummary {
    pub id: i64,
    pub url: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub measurements: String,
    pub version: String,
    pub changelog_url: String,
    pub contribute_url: String,
    pub thumbnail: Option<String>,
    pub xpi_url: String,
    pub addon_id: String,
    pub details: Vec<ExperimentDetailSummary>,
    pub contributors: Vec<ContributorSummary>,
    #[serde(serialize_with = "serialize_api_datetime")]
    pub created: DateTime<Utc>,
    #[serde(serialize_with = "serialize_api_datetime")]
    pub modified: DateTime<Utc>,
}

pub fn experiment_url(origin: &str, experiment_id: i64) -> String {
    format!(
        "{}/api/experiments/{}",
        origin.trim_end_matches('/'),
        experiment_id
    )
}

impl ExperimentSummary {
    pub fn from_experiment(experiment: &Experiment, origin: &str) -> Self {
        Self {
            id: experiment.id,
            url: experiment_url(origin, experiment.id),
            slug: experiment.slug.clone(),
            title: experiment.title.clone(),
            description: experiment.description.clone(),
            measurements: experiment.measurements_rendered.clone(),
            version: experiment.version.clone(),
            changelog_url: experiment.changelog_url.clone(),
            contribute_url: experiment.contribute_url.clone(),
            thumbnail: experiment.thumbnail.clone(),
            xpi_url: experiment.xpi_url.clone(),
            addon_id: experiment.addon_id.clone(),
            details: experiment
                .details
                .iter()
                .map(|detail| ExperimentDetailSummary {
                    headline: detail.headline.clone(),
                    image: detail.image.clone(),
                    copy: detail.copy.clone(),
                })
                .collect(),
            contributors: experiment
                .contributors
                .iter()
                .map(|contributor| ContributorSummary {
                    display_name: contributor.display_name.clone(),
                    title: contributor.title.clone(),
                })
                .collect(),
            created: experiment.created,
            modified: experiment.modified,
        }
    }
}
