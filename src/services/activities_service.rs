use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::activities_repo::{self, ActivityFields};
use crate::database::{attendees_repo, timestamps};
use crate::error::AppError;
use crate::models::{ActivitiesRow, AttendeeProfileRow};
use crate::services::profile_service::UserProfile;
use crate::services::validation::{self, ActivityForm};

pub const DEFAULT_PAGE_SIZE: i64 = 3;
pub const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityParams {
    pub cursor: Option<DateTime<Utc>>,
    pub page_size: Option<i64>,
    pub filter: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityFilter {
    All,
    IsGoing,
    IsHost,
}

impl ActivityFilter {
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            Some("isGoing") => ActivityFilter::IsGoing,
            Some("isHost") => ActivityFilter::IsHost,
            _ => ActivityFilter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityFilter::All => "all",
            ActivityFilter::IsGoing => "isGoing",
            ActivityFilter::IsHost => "isHost",
        }
    }
}

pub fn effective_page_size(requested: Option<i64>) -> i64 {
    match requested {
        Some(size) if size > 0 => size.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: String,
    pub is_cancelled: bool,
    pub host_display_name: String,
    pub host_id: String,
    pub city: String,
    pub venue: String,
    pub latitude: f64,
    pub longitude: f64,
    pub attendees: Vec<UserProfile>,
}

/// Splits a `page_size + 1` fetch into the page and the cursor of the next
/// page (the date of the first row that did not fit).
pub fn split_page<T>(
    mut rows: Vec<T>,
    page_size: usize,
    date_of: impl Fn(&T) -> &str,
) -> (Vec<T>, Option<String>) {
    if rows.len() <= page_size {
        return (rows, None);
    }
    rows.truncate(page_size + 1);
    let next = rows.pop().map(|row| date_of(&row).to_string());
    (rows, next)
}

fn parse_stored_date(activity_id: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    timestamps::from_db(raw)
        .ok_or_else(|| AppError::Internal(format!("activity {activity_id} has a corrupt date")))
}

fn build_activity_dto(
    row: ActivitiesRow,
    attendees: Vec<AttendeeProfileRow>,
) -> Result<ActivityDto, AppError> {
    let date = parse_stored_date(&row.id, &row.date)?;

    let (host_id, host_display_name) = attendees
        .iter()
        .find(|a| a.is_host != 0)
        .map(|a| (a.user_id.clone(), a.display_name.clone().unwrap_or_default()))
        .unwrap_or_default();

    Ok(ActivityDto {
        id: row.id,
        title: row.title,
        date,
        description: row.description,
        category: row.category,
        is_cancelled: row.is_cancelled != 0,
        host_display_name,
        host_id,
        city: row.city,
        venue: row.venue,
        latitude: row.latitude,
        longitude: row.longitude,
        attendees: attendees.into_iter().map(UserProfile::from).collect(),
    })
}

async fn attach_attendees(
    pool: &SqlitePool,
    viewer_id: &str,
    rows: Vec<ActivitiesRow>,
) -> Result<Vec<ActivityDto>, AppError> {
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let mut by_activity: HashMap<String, Vec<AttendeeProfileRow>> = HashMap::new();
    for attendee in attendees_repo::list_attendee_profiles(pool, viewer_id, &ids).await? {
        by_activity
            .entry(attendee.activity_id.clone())
            .or_default()
            .push(attendee);
    }

    rows.into_iter()
        .map(|row| {
            let attendees = by_activity.remove(&row.id).unwrap_or_default();
            build_activity_dto(row, attendees)
        })
        .collect()
}

pub async fn list_activities(
    pool: &SqlitePool,
    viewer_id: &str,
    params: &ActivityParams,
) -> Result<PagedList<ActivityDto>, AppError> {
    let page_size = effective_page_size(params.page_size);
    let filter = ActivityFilter::parse(params.filter.as_deref());
    let from = params
        .cursor
        .or(params.start_date)
        .unwrap_or_else(Utc::now);

    let rows = activities_repo::list_activities_from(
        pool,
        &timestamps::to_db(from),
        filter.as_str(),
        viewer_id,
        page_size + 1,
    )
    .await?;

    let (rows, next_cursor) = split_page(rows, page_size as usize, |r| r.date.as_str());
    let next_cursor = next_cursor.as_deref().and_then(timestamps::from_db);

    Ok(PagedList {
        items: attach_attendees(pool, viewer_id, rows).await?,
        next_cursor,
    })
}

pub async fn get_activity(
    pool: &SqlitePool,
    viewer_id: &str,
    activity_id: &str,
) -> Result<ActivityDto, AppError> {
    let row = activities_repo::get_activity(pool, activity_id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity not found"))?;

    attach_attendees(pool, viewer_id, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Activity not found"))
}

fn activity_fields<'a>(form: &'a ActivityForm, date: &'a str) -> ActivityFields<'a> {
    ActivityFields {
        title: form.title.trim(),
        date,
        description: form.description.trim(),
        category: form.category.trim(),
        city: form.city.trim(),
        venue: form.venue.trim(),
        latitude: form.latitude,
        longitude: form.longitude,
    }
}

fn validated_date(form: &ActivityForm) -> Result<String, AppError> {
    validation::validate_activity(form, Utc::now()).into_result()?;
    let date = form
        .date
        .ok_or_else(|| AppError::invalid("Date", "Date must be in the future"))?;
    Ok(timestamps::to_db(date))
}

/// Creates the activity with the caller as its host and returns the new id.
pub async fn create_activity(
    pool: &SqlitePool,
    host_user_id: &str,
    form: &ActivityForm,
) -> Result<String, AppError> {
    let date = validated_date(form)?;
    let id = Uuid::new_v4().to_string();

    activities_repo::insert_activity_with_host(
        pool,
        &id,
        &activity_fields(form, &date),
        host_user_id,
        &timestamps::now(),
    )
    .await?;

    info!(activity_id = %id, host_user_id, "activity created");
    Ok(id)
}

pub async fn edit_activity(
    pool: &SqlitePool,
    activity_id: &str,
    form: &ActivityForm,
) -> Result<(), AppError> {
    let date = validated_date(form)?;
    let updated =
        activities_repo::update_activity(pool, activity_id, &activity_fields(form, &date)).await?;
    if updated == 0 {
        return Err(AppError::not_found("Activity not found"));
    }
    Ok(())
}

pub async fn delete_activity(pool: &SqlitePool, activity_id: &str) -> Result<(), AppError> {
    let deleted = activities_repo::delete_activity(pool, activity_id).await?;
    if deleted == 0 {
        return Err(AppError::not_found("Activity not found"));
    }
    info!(activity_id, "activity deleted");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceChange {
    Joined,
    Left,
    Cancelled,
    Reactivated,
}

/// Toggles the caller's attendance. Hosts cannot leave; toggling as host
/// flips the cancellation flag instead.
pub async fn update_attendance(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
) -> Result<AttendanceChange, AppError> {
    let activity = activities_repo::get_activity(pool, activity_id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity not found"))?;

    let change = match attendees_repo::find_attendee(pool, activity_id, user_id).await? {
        Some(attendee) if attendee.is_host != 0 => {
            let cancel = activity.is_cancelled == 0;
            activities_repo::set_cancelled(pool, activity_id, cancel).await?;
            if cancel {
                AttendanceChange::Cancelled
            } else {
                AttendanceChange::Reactivated
            }
        }
        Some(_) => {
            attendees_repo::delete_attendee(pool, activity_id, user_id).await?;
            AttendanceChange::Left
        }
        None => {
            attendees_repo::insert_attendee(pool, activity_id, user_id, false, &timestamps::now())
                .await?;
            AttendanceChange::Joined
        }
    };

    info!(activity_id, user_id, change = ?change, "attendance updated");
    Ok(change)
}

/// Host-only guard: 404 for an unknown activity, 403 for a non-host.
pub async fn ensure_host(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    if !activities_repo::activity_exists(pool, activity_id).await? {
        return Err(AppError::not_found("Activity not found"));
    }
    match attendees_repo::find_attendee(pool, activity_id, user_id).await? {
        Some(attendee) if attendee.is_host != 0 => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}
