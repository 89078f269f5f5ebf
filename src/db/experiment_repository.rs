use async_trait::async_trait;
use uuid::Uuid;

use crate::models::experiment::Experiment;

/// Read access to experiments and the installations that link them to users.
/// Returned experiments carry their details and contributors.
#[async_trait]
pub trait ExperimentRepository: Send + Sync {
    async fn list_experiments(&self) -> Result<Vec<Experiment>, sqlx::Error>;
    async fn find_experiment(&self, experiment_id: i64) -> Result<Option<Experiment>, sqlx::Error>;
    /// Experiments the user has installed, in installation order.
    async fn list_installed_experiments(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Experiment>, sqlx::Error>;
}
