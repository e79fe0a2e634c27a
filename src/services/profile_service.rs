use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::database::{activities_repo, followings_repo, profiles_repo, timestamps, user_repo};
use crate::error::{AppError, ValidationErrors};
use crate::models::{AttendeeProfileRow, UserActivityRow, UserProfilesRow};
use crate::services::validation;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub following: bool,
}

impl From<UserProfilesRow> for UserProfile {
    fn from(row: UserProfilesRow) -> Self {
        Self {
            id: row.id,
            display_name: row.display_name.unwrap_or_default(),
            bio: row.bio,
            image_url: row.image_url,
            followers_count: row.followers_count,
            following_count: row.following_count,
            following: row.following != 0,
        }
    }
}

impl From<AttendeeProfileRow> for UserProfile {
    fn from(row: AttendeeProfileRow) -> Self {
        Self {
            id: row.user_id,
            display_name: row.display_name.unwrap_or_default(),
            bio: row.bio,
            image_url: row.image_url,
            followers_count: row.followers_count,
            following_count: row.following_count,
            following: row.following != 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityDto {
    pub id: String,
    pub title: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditProfileForm {
    pub display_name: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserActivityFilter {
    Past,
    Hosting,
    Future,
}

impl UserActivityFilter {
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            Some("past") => UserActivityFilter::Past,
            Some("hosting") => UserActivityFilter::Hosting,
            _ => UserActivityFilter::Future,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserActivityFilter::Past => "past",
            UserActivityFilter::Hosting => "hosting",
            UserActivityFilter::Future => "future",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowPredicate {
    Followers,
    Followings,
}

impl FollowPredicate {
    /// `None` for predicates that select nothing.
    pub fn parse(input: Option<&str>) -> Option<Self> {
        match input.map(str::trim).unwrap_or("followers") {
            "followers" => Some(FollowPredicate::Followers),
            "followings" => Some(FollowPredicate::Followings),
            _ => None,
        }
    }
}

pub async fn get_profile(
    pool: &SqlitePool,
    viewer_id: &str,
    user_id: &str,
) -> Result<UserProfile, AppError> {
    profiles_repo::load_profile(pool, viewer_id, user_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

pub async fn edit_profile(
    pool: &SqlitePool,
    user_id: &str,
    form: &EditProfileForm,
) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();
    validation::validate_display_name(&form.display_name, &mut errors);
    errors.into_result()?;

    let updated = user_repo::update_profile(
        pool,
        user_id,
        form.display_name.trim(),
        form.bio.as_deref(),
    )
    .await?;
    if updated == 0 {
        return Err(AppError::bad_request("Failed to update profile"));
    }
    Ok(())
}

pub async fn get_user_activities(
    pool: &SqlitePool,
    user_id: &str,
    filter: UserActivityFilter,
) -> Result<Vec<UserActivityDto>, AppError> {
    let rows =
        activities_repo::list_user_activities(pool, user_id, filter.as_str(), &timestamps::now())
            .await?;
    rows.into_iter().map(user_activity_dto).collect()
}

fn user_activity_dto(row: UserActivityRow) -> Result<UserActivityDto, AppError> {
    let date = timestamps::from_db(&row.date)
        .ok_or_else(|| AppError::Internal(format!("activity {} has a corrupt date", row.id)))?;
    Ok(UserActivityDto {
        id: row.id,
        title: row.title,
        category: row.category,
        date,
    })
}

/// Follows `target_id` when not yet following, unfollows otherwise.
/// Returns whether the observer follows the target afterwards.
pub async fn toggle_follow(
    pool: &SqlitePool,
    observer_id: &str,
    target_id: &str,
) -> Result<bool, AppError> {
    if observer_id == target_id {
        return Err(AppError::bad_request("You cannot follow yourself"));
    }
    if !user_repo::user_exists(pool, target_id).await? {
        return Err(AppError::not_found("User not found"));
    }

    if followings_repo::is_following(pool, observer_id, target_id).await? {
        followings_repo::delete_following(pool, observer_id, target_id).await?;
        info!(observer_id, target_id, "unfollowed");
        Ok(false)
    } else {
        followings_repo::insert_following(pool, observer_id, target_id).await?;
        info!(observer_id, target_id, "followed");
        Ok(true)
    }
}

pub async fn get_followings(
    pool: &SqlitePool,
    viewer_id: &str,
    user_id: &str,
    predicate: Option<FollowPredicate>,
) -> Result<Vec<UserProfile>, AppError> {
    let rows = match predicate {
        Some(FollowPredicate::Followers) => {
            profiles_repo::list_followers(pool, viewer_id, user_id).await?
        }
        Some(FollowPredicate::Followings) => {
            profiles_repo::list_followings(pool, viewer_id, user_id).await?
        }
        None => Vec::new(),
    };
    Ok(rows.into_iter().map(UserProfile::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_activity_filter_defaults_to_future() {
        assert_eq!(UserActivityFilter::parse(None), UserActivityFilter::Future);
        assert_eq!(UserActivityFilter::parse(Some("past")), UserActivityFilter::Past);
        assert_eq!(
            UserActivityFilter::parse(Some("hosting")),
            UserActivityFilter::Hosting
        );
        assert_eq!(UserActivityFilter::parse(Some("bogus")), UserActivityFilter::Future);
    }

    #[test]
    fn follow_predicate_defaults_to_followers() {
        assert_eq!(FollowPredicate::parse(None), Some(FollowPredicate::Followers));
        assert_eq!(
            FollowPredicate::parse(Some("followings")),
            Some(FollowPredicate::Followings)
        );
        assert_eq!(FollowPredicate::parse(Some("friends")), None);
    }
}
