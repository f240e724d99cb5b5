use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::error::{validate_identifier, AnalyzerError, Result};
use crate::store::schema::Preferences;

/// User that always resolves, to stored preferences or to the defaults.
pub const DEFAULT_USER_ID: &str = "default";

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Stored record for a user, if any
    async fn get(&self, user_id: &str) -> Result<Option<Preferences>>;

    /// Replace the record for a user
    async fn put(&self, user_id: &str, preferences: &Preferences) -> Result<()>;

    /// Preferences used for analysis; unknown users other than `default` are not-found
    async fn resolve(&self, user_id: &str) -> Result<Preferences> {
        validate_identifier("user id", user_id)?;
        match self.get(user_id).await? {
            Some(prefs) => Ok(prefs),
            None if user_id == DEFAULT_USER_ID => Ok(Preferences::default()),
            None => Err(AnalyzerError::not_found(format!("User not found: {}", user_id))),
        }
    }
}

/// `<users_dir>/<user_id>_preferences.json`
pub struct FilePreferenceStore {
    users_dir: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(users_dir: impl Into<PathBuf>) -> Self {
        Self {
            users_dir: users_dir.into(),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.users_dir.join(format!("{}_preferences.json", user_id))
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, user_id: &str) -> Result<Option<Preferences>> {
        validate_identifier("user id", user_id)?;
        match tokio::fs::read_to_string(self.path_for(user_id)).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored preferences for {}", user_id);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, user_id: &str, preferences: &Preferences) -> Result<()> {
        validate_identifier("user id", user_id)?;
        tokio::fs::create_dir_all(&self.users_dir).await?;
        let body = serde_json::to_string_pretty(preferences)?;
        let path = self.path_for(user_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        info!("Saved preferences for {}", user_id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPreferenceStore {
    store: Arc<DashMap<String, Preferences>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, user_id: &str) -> Result<Option<Preferences>> {
        validate_identifier("user id", user_id)?;
        Ok(self.store.get(user_id).map(|entry| entry.clone()))
    }

    async fn put(&self, user_id: &str, preferences: &Preferences) -> Result<()> {
        validate_identifier("user id", user_id)?;
        self.store.insert(user_id.to_string(), preferences.clone());
        Ok(())
    }
}
