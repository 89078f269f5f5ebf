pub mod experiment_repository;
pub mod postgres_experiment_repository;
pub mod postgres_profile_repository;
pub mod postgres_user_repository;
pub mod profile_repository;
pub mod user_repository;

#[cfg(test)]
pub mod mock_db;
