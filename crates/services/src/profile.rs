//! # Profiles
//!
//! Read and edit the caller's own profile. A profile row is created lazily
//! the first time an authenticated user touches it.

use std::sync::Arc;

use bytes::Bytes;
use domains::{DomainError, MediaStorage, Profile, ProfileRepository, ProfileUpdate, Result, Session};
use uuid::Uuid;

use crate::photo::Photo;

pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    media: Arc<dyn MediaStorage>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, media: Arc<dyn MediaStorage>) -> Self {
        Self { profiles, media }
    }

    /// Returns the caller's profile, creating a blank one on first access.
    pub async fn get(&self, session: &Session) -> Result<Profile> {
        match self.profiles.get_profile(session.user_id).await? {
            Some(profile) => Ok(profile),
            None => {
                tracing::info!(user_id = %session.user_id, "creating blank profile");
                self.profiles.create_profile(Profile::blank(session.user_id)).await
            }
        }
    }

    pub async fn update(&self, session: &Session, update: ProfileUpdate) -> Result<Profile> {
        let update = normalize(update);
        if update.is_empty() {
            return Err(DomainError::Validation("nothing to update".to_string()));
        }
        self.get(session).await?;
        self.profiles
            .update_profile(session.user_id, update)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", session.user_id))
    }

    /// Stores the avatar at a fixed per-user path, replacing any previous
    /// one, and points the profile at it.
    pub async fn upload_avatar(&self, session: &Session, data: Bytes) -> Result<Profile> {
        let photo = Photo::from_bytes(data)?;
        let path = avatar_path(session.user_id, photo.extension());
        let url = self.media.upload(&path, photo.bytes(), photo.content_type()).await?;
        tracing::info!(user_id = %session.user_id, %path, "avatar stored");

        self.update(session, ProfileUpdate { avatar_url: Some(url), ..Default::default() })
            .await
    }
}

pub fn avatar_path(user_id: Uuid, extension: &str) -> String {
    format!("avatars/{user_id}.{extension}")
}

/// Trims text fields. A field that trims to empty clears nothing; it is
/// treated as not supplied.
fn normalize(update: ProfileUpdate) -> ProfileUpdate {
    fn clean(value: Option<String>) -> Option<String> {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }
    ProfileUpdate {
        full_name: clean(update.full_name),
        contact: clean(update.contact),
        avatar_url: clean(update.avatar_url),
        bio: clean(update.bio),
    }
}
