use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::experiment_repository::ExperimentRepository,
    models::experiment::{Experiment, ExperimentContributor, ExperimentDetail},
};

pub struct PostgresExperimentRepository {
    pub pool: PgPool,
}

const EXPERIMENT_COLUMNS: &str = r#"
    e.id, e.slug, e.title, e.description, e.measurements_rendered, e.version,
    e.changelog_url, e.contribute_url, e.thumbnail, e.xpi_url, e.addon_id,
    e.created, e.modified
"#;

impl PostgresExperimentRepository {
    /// Loads details and contributors for a batch of experiments with one
    /// query each, preserving the experiments' order.
    async fn attach_related(&self, experiments: &mut [Experiment]) -> Result<(), sqlx::Error> {
        if experiments.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = experiments.iter().map(|e| e.id).collect();

        let details = sqlx::query_as::<_, ExperimentDetail>(
            r#"
            SELECT experiment_id, headline, image, copy
            FROM experiment_details
            WHERE experiment_id = ANY($1)
            ORDER BY experiment_id, sort_order, id
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let contributors = sqlx::query_as::<_, ExperimentContributor>(
            r#"
            SELECT ec.experiment_id,
                   u.display_name,
                   COALESCE(p.title, '') AS title
            FROM experiment_contributors ec
            JOIN users u ON u.id = ec.user_id
            LEFT JOIN user_profiles p ON p.user_id = ec.user_id
            WHERE ec.experiment_id = ANY($1)
            ORDER BY ec.experiment_id, ec.sort_order, u.display_name
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut details_by_experiment: HashMap<i64, Vec<ExperimentDetail>> = HashMap::new();
        for detail in details {
            details_by_experiment
                .entry(detail.experiment_id)
                .or_default()
                .push(detail);
        }
        let mut contributors_by_experiment: HashMap<i64, Vec<ExperimentContributor>> =
            HashMap::new();
        for contributor in contributors {
            contributors_by_experiment
                .entry(contributor.experiment_id)
                .or_default()
                .push(contributor);
        }

        for experiment in experiments.iter_mut() {
            experiment.details = details_by_experiment
                .remove(&experiment.id)
                .unwrap_or_default();
            experiment.contributors = contributors_by_experiment
                .remove(&experiment.id)
                .unwrap_or_default();
        }
        Ok(())
    }
}

#[async_trait]
impl ExperimentRepository for PostgresExperimentRepository {
    async fn list_experiments(&self) -> Result<Vec<Experiment>, sqlx::Error> {
        let sql = format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments e ORDER BY e.id");
        let mut experiments = sqlx::query_as::<_, Experiment>(&sql)
            .fetch_all(&self.pool)
            .await?;
        self.attach_related(&mut experiments).await?;
        Ok(experiments)
    }

    async fn find_experiment(&self, experiment_id: i64) -> Result<Option<Experiment>, sqlx::Error> {
        let sql = format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments e WHERE e.id = $1");
        let experiment = sqlx::query_as::<_, Experiment>(&sql)
            .bind(experiment_id)
            .fetch_optional(&self.pool)
            .await?;

        match experiment {
            Some(experiment) => {
                let mut batch = [experiment];
                self.attach_related(&mut batch).await?;
                let [experiment] = batch;
                Ok(Some(experiment))
            }
            None => Ok(None),
        }
    }

    async fn list_installed_experiments(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Experiment>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {EXPERIMENT_COLUMNS}
            FROM user_installations ui
            JOIN experiments e ON e.id = ui.experiment_id
            WHERE ui.user_id = $1
            ORDER BY ui.created, ui.id
            "#
        );
        let mut experiments = sqlx::query_as::<_, Experiment>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_related(&mut experiments).await?;
        Ok(experiments)
    }
}
