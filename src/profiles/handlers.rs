use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, FieldError},
    profiles::{
        dto::{
            parse_skills, AddEducationRequest, AddExperienceRequest, ProfileWithOwner,
            UpsertProfileRequest,
        },
        repo::{
            self, EducationEntry, ExperienceEntry, Profile, ProfileFields,
        },
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/me", get(my_profile))
        .route("/profile", post(upsert_profile).get(list_profiles).delete(delete_account))
        .route("/profile/user/:user_id", get(profile_by_user))
}

pub fn experience_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/experience", put(add_experience))
        .route("/profile/experience/:exp_id", delete(remove_experience))
}

pub fn education_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/education", put(add_education))
        .route("/profile/education/:edu_id", delete(remove_education))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileWithOwner>, ApiError> {
    let row = repo::find_with_owner_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::BadRequest("There is no profile for this user"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    if payload.status.trim().is_empty() {
        errors.push(FieldError::field("status", "Status is required"));
    }
    if payload.skills.trim().is_empty() {
        errors.push(FieldError::field("skills", "Skills is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let fields = ProfileFields {
        company: non_empty(payload.company),
        website: non_empty(payload.website),
        location: non_empty(payload.location),
        status: payload.status.trim().to_string(),
        bio: non_empty(payload.bio),
        github_username: non_empty(payload.github_username),
        skills: parse_skills(&payload.skills),
    };

    let profile = Profile::upsert(&state.db, user_id, &fields).await?;
    info!(user_id = %user_id, profile_id = %profile.id, "profile upserted");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileWithOwner>>, ApiError> {
    let rows = repo::list_with_owner(&state.db).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileWithOwner>, ApiError> {
    // A malformed id is indistinguishable from a missing profile to the
    // caller.
    let Ok(user_id) = user_id.parse::<Uuid>() else {
        return Err(ApiError::NotFound("Profile not found"));
    };
    let row = repo::find_with_owner_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile not found"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    repo::delete_profile_and_user(&state.db, user_id).await?;
    info!(user_id = %user_id, "profile and account deleted");
    Ok(Json(json!({ "msg": "User deleted" })))
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    if payload.title.trim().is_empty() {
        errors.push(FieldError::field("title", "Title is required"));
    }
    if payload.company.trim().is_empty() {
        errors.push(FieldError::field("company", "Company is required"));
    }
    if payload.from_date.trim().is_empty() {
        errors.push(FieldError::field("from", "From date is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("There is no profile for this user"))?;

    let entry = ExperienceEntry {
        id: Uuid::new_v4(),
        title: payload.title,
        company: payload.company,
        location: payload.location,
        from_date: payload.from_date,
        to: payload.to,
        current: payload.current,
        description: payload.description,
    };

    let mut entries = profile.experience.0;
    entries.insert(0, entry);
    let profile = Profile::save_experience(&state.db, profile.id, &entries).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("There is no profile for this user"))?;

    // Unknown or malformed sub-ids leave the list as-is.
    let Ok(exp_id) = exp_id.parse::<Uuid>() else {
        warn!(%user_id, "malformed experience id");
        return Ok(Json(profile));
    };

    let mut entries = profile.experience.0.clone();
    repo::remove_entry(&mut entries, exp_id, |e| e.id);
    if entries.len() == profile.experience.0.len() {
        return Ok(Json(profile));
    }

    let profile = Profile::save_experience(&state.db, profile.id, &entries).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddEducationRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    if payload.school.trim().is_empty() {
        errors.push(FieldError::field("school", "School is required"));
    }
    if payload.degree.trim().is_empty() {
        errors.push(FieldError::field("degree", "Degree is required"));
    }
    if payload.fieldofstudy.trim().is_empty() {
        errors.push(FieldError::field("fieldofstudy", "Field of study is required"));
    }
    if payload.from_date.trim().is_empty() {
        errors.push(FieldError::field("from", "From date is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("There is no profile for this user"))?;

    let entry = EducationEntry {
        id: Uuid::new_v4(),
        school: payload.school,
        degree: payload.degree,
        fieldofstudy: payload.fieldofstudy,
        from_date: payload.from_date,
        to: payload.to,
        current: payload.current,
        description: payload.description,
    };

    let mut entries = profile.education.0;
    entries.insert(0, entry);
    let profile = Profile::save_education(&state.db, profile.id, &entries).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("There is no profile for this user"))?;

    let Ok(edu_id) = edu_id.parse::<Uuid>() else {
        warn!(%user_id, "malformed education id");
        return Ok(Json(profile));
    };

    let mut entries = profile.education.0.clone();
    repo::remove_entry(&mut entries, edu_id, |e| e.id);
    if entries.len() == profile.education.0.len() {
        return Ok(Json(profile));
    }

    let profile = Profile::save_education(&state.db, profile.id, &entries).await?;
    Ok(Json(profile))
}
