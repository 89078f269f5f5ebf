use crate::models::experiment::Experiment;
use crate::models::profile::UserProfile;
use crate::models::user::{ExternalIdentity, User};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use super::experiment_repository::ExperimentRepository;
use super::profile_repository::ProfileRepository;
use super::user_repository::UserRepository;

#[derive(Debug, Clone)]
struct Installation {
    experiment_id: i64,
    user_id: Uuid,
}

/// In-memory stand-in for every repository. Profiles are kept in a `Vec`
/// rather than keyed by user so that tests can observe duplicates if the
/// get-or-create logic ever produced them.
pub struct MockDb {
    pub should_fail: bool,
    pub users: Mutex<Vec<User>>,
    pub external_accounts: Mutex<Vec<(String, String, Uuid)>>,
    pub profiles: Mutex<Vec<UserProfile>>,
    pub experiments: Mutex<Vec<Experiment>>,
    installations: Mutex<Vec<Installation>>,
    next_profile_id: Mutex<i64>,
}

impl Default for MockDb {
    fn default() -> Self {
        Self {
            should_fail: false,
            users: Mutex::new(vec![]),
            external_accounts: Mutex::new(vec![]),
            profiles: Mutex::new(vec![]),
            experiments: Mutex::new(vec![]),
            installations: Mutex::new(vec![]),
            next_profile_id: Mutex::new(1),
        }
    }
}

impl MockDb {
    /// Every repository call returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn fail_if_requested(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(())
    }

    fn allocate_profile_id(&self) -> i64 {
        let mut next = self.next_profile_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    }

    pub fn insert_user(&self, email: &str, display_name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn link_external_account(&self, provider: &str, uid: &str, user_id: Uuid) {
        self.external_accounts.lock().unwrap().push((
            provider.to_string(),
            uid.to_string(),
            user_id,
        ));
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }

    pub fn insert_profile(&self, user_id: Uuid, title: &str, invite_pending: bool) -> UserProfile {
        let profile = UserProfile {
            id: self.allocate_profile_id(),
            user_id,
            title: title.to_string(),
            invite_pending,
        };
        self.profiles.lock().unwrap().push(profile.clone());
        profile
    }

    pub fn delete_profiles_for_user(&self, user_id: Uuid) {
        self.profiles
            .lock()
            .unwrap()
            .retain(|profile| profile.user_id != user_id);
    }

    pub fn profile_count(&self, user_id: Uuid) -> usize {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|profile| profile.user_id == user_id)
            .count()
    }

    /// Adds an experiment with the given slug and title and no related rows.
    pub fn insert_experiment(&self, slug: &str, title: &str, description: &str) -> Experiment {
        let mut experiments = self.experiments.lock().unwrap();
        let now = Utc::now();
        let experiment = Experiment {
            id: experiments.len() as i64 + 1,
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            measurements_rendered: String::new(),
            version: String::new(),
            changelog_url: String::new(),
            contribute_url: String::new(),
            thumbnail: None,
            xpi_url: String::new(),
            addon_id: String::new(),
            created: now,
            modified: now,
            details: vec![],
            contributors: vec![],
        };
        experiments.push(experiment.clone());
        experiment
    }

    pub fn install(&self, user_id: Uuid, experiment_id: i64) {
        self.installations.lock().unwrap().push(Installation {
            experiment_id,
            user_id,
        });
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.fail_if_requested()?;
        Ok(self.user(user_id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.fail_if_requested()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_external_account(
        &self,
        provider: &str,
        uid: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        self.fail_if_requested()?;
        let user_id = self
            .external_accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(p, u, _)| p == provider && u == uid)
            .map(|(_, _, user_id)| *user_id);
        Ok(user_id.and_then(|id| self.user(id)))
    }

    async fn create_user_with_external_account(
        &self,
        identity: &ExternalIdentity,
        is_active: bool,
        invite_pending: bool,
    ) -> Result<User, sqlx::Error> {
        self.fail_if_requested()?;
        let user = User {
            id: Uuid::new_v4(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            is_active,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(user.clone());
        self.link_external_account(&identity.provider, &identity.uid, user.id);
        self.insert_profile(user.id, "", invite_pending);
        Ok(user)
    }
}

#[async_trait]
impl ProfileRepository for MockDb {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        self.fail_if_requested()?;
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, sqlx::Error> {
        self.fail_if_requested()?;
        // Lookup and insert happen under one lock, like the upsert in Postgres.
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(existing) = profiles.iter().find(|p| p.user_id == user_id) {
            return Ok(existing.clone());
        }
        let profile = UserProfile {
            id: self.allocate_profile_id(),
            user_id,
            title: String::new(),
            invite_pending: false,
        };
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn apply_invite_state(
        &self,
        user_id: Uuid,
        is_active: bool,
        invite_pending: bool,
    ) -> Result<UserProfile, sqlx::Error> {
        self.fail_if_requested()?;
        {
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or(sqlx::Error::RowNotFound)?;
            user.is_active = is_active;
        }

        let mut profile = self.get_profile(user_id).await?;
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(stored) = profiles.iter_mut().find(|p| p.user_id == user_id) {
            stored.invite_pending = invite_pending;
        }
        profile.invite_pending = invite_pending;
        Ok(profile)
    }
}

#[async_trait]
impl ExperimentRepository for MockDb {
    async fn list_experiments(&self) -> Result<Vec<Experiment>, sqlx::Error> {
        self.fail_if_requested()?;
        let mut experiments = self.experiments.lock().unwrap().clone();
        experiments.sort_by_key(|e| e.id);
        Ok(experiments)
    }

    async fn find_experiment(&self, experiment_id: i64) -> Result<Option<Experiment>, sqlx::Error> {
        self.fail_if_requested()?;
        Ok(self
            .experiments
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == experiment_id)
            .cloned())
    }

    async fn list_installed_experiments(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Experiment>, sqlx::Error> {
        self.fail_if_requested()?;
        let installed: Vec<i64> = self
            .installations
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| i.experiment_id)
            .collect();
        let experiments = self.experiments.lock().unwrap();
        Ok(installed
            .into_iter()
            .filter_map(|id| experiments.iter().find(|e| e.id == id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_profile_creates_profile_on_first_access() {
        let db = MockDb::default();
        let user = db.insert_user("johndoe2@example.com", "John Doe");
        assert_eq!(db.profile_count(user.id), 0);

        let profile = db.get_profile(user.id).await.unwrap();

        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.title, "");
        assert!(!profile.invite_pending);
        assert_eq!(db.profile_count(user.id), 1);
    }

    #[tokio::test]
    async fn find_profile_never_creates() {
        let db = MockDb::default();
        let user = db.insert_user("johndoe2@example.com", "John Doe");

        assert_eq!(db.find_profile(user.id).await.unwrap(), None);
        assert_eq!(db.profile_count(user.id), 0);

        let stored = db.insert_profile(user.id, "chief cat wrangler", true);
        assert_eq!(db.find_profile(user.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn created_user_carries_its_invite_state() {
        let db = MockDb::default();
        let identity = ExternalIdentity {
            provider: "fxa".into(),
            uid: "uid-1".into(),
            email: "outsider@example.com".into(),
            display_name: "Outsider".into(),
        };

        let user = db
            .create_user_with_external_account(&identity, false, true)
            .await
            .unwrap();

        assert!(!user.is_active);
        assert!(!db.user(user.id).unwrap().is_active);
        assert!(db.find_profile(user.id).await.unwrap().unwrap().invite_pending);
        assert_eq!(
            db.find_user_by_external_account("fxa", "uid-1")
                .await
                .unwrap()
                .map(|u| u.id),
            Some(user.id)
        );
    }

    #[tokio::test]
    async fn get_profile_returns_existing_profile_unchanged() {
        let db = MockDb::default();
        let user = db.insert_user("johndoe2@example.com", "John Doe");
        let stored = db.insert_profile(user.id, "chief cat wrangler", false);

        let profile = db.get_profile(user.id).await.unwrap();

        assert_eq!(profile, stored);
        assert_eq!(profile.title, "chief cat wrangler");
        assert_eq!(db.profile_count(user.id), 1);
    }

    #[tokio::test]
    async fn repeated_get_profile_never_duplicates() {
        let db = MockDb::default();
        let user = db.insert_user("johndoe2@example.com", "John Doe");

        let first = db.get_profile(user.id).await.unwrap();
        for _ in 0..5 {
            let again = db.get_profile(user.id).await.unwrap();
            assert_eq!(again.id, first.id);
        }
        assert_eq!(db.profile_count(user.id), 1);
    }

    #[tokio::test]
    async fn concurrent_first_access_yields_one_profile() {
        let db = std::sync::Arc::new(MockDb::default());
        let user_id = db.insert_user("racer@example.com", "Racer").id;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { db.get_profile(user_id).await.unwrap().id })
            })
            .collect();

        let mut ids = vec![];
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(db.profile_count(user_id), 1);
    }

    #[tokio::test]
    async fn apply_invite_state_updates_user_and_profile() {
        let db = MockDb::default();
        let user = db.insert_user("newuserdoe2@example.com", "New User");

        let profile = db.apply_invite_state(user.id, false, true).await.unwrap();

        assert!(profile.invite_pending);
        assert!(!db.user(user.id).unwrap().is_active);
        assert_eq!(db.profile_count(user.id), 1);
    }

    #[tokio::test]
    async fn apply_invite_state_for_unknown_user_fails() {
        let db = MockDb::default();
        let err = db
            .apply_invite_state(Uuid::new_v4(), true, false)
            .await
            .unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn installed_experiments_follow_installation_order() {
        let db = MockDb::default();
        let user = db.insert_user("johndoe@example.com", "John Doe");
        let first = db.insert_experiment("test-1", "Test 1", "This is a test");
        let second = db.insert_experiment("test-2", "Test 2", "This is a test");
        db.install(user.id, second.id);
        db.install(user.id, first.id);

        let installed = db.list_installed_experiments(user.id).await.unwrap();
        let slugs: Vec<_> = installed.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["test-2", "test-1"]);
    }
}
