use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo::{EducationEntry, ExperienceEntry, ProfileOwnerRow};

/// Request body for create-or-update. Status and skills are required;
/// everything else is optional and ignored when blank.
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, rename = "githubusername")]
    pub github_username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddExperienceRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "from")]
    pub from_date: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddEducationRequest {
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub fieldofstudy: String,
    #[serde(default, rename = "from")]
    pub from_date: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Owner display fields attached to public profile reads.
#[derive(Debug, Serialize)]
pub struct OwnerInfo {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

/// Profile enriched with its owner, the shape returned by the public
/// profile reads and `/profile/me`.
#[derive(Debug, Serialize)]
pub struct ProfileWithOwner {
    pub id: Uuid,
    pub user: OwnerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "githubusername", skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub experience: Json<Vec<ExperienceEntry>>,
    pub education: Json<Vec<EducationEntry>>,
    pub created_at: OffsetDateTime,
}

impl From<ProfileOwnerRow> for ProfileWithOwner {
    fn from(row: ProfileOwnerRow) -> Self {
        Self {
            id: row.id,
            user: OwnerInfo {
                id: row.user_id,
                name: row.owner_name,
                avatar: row.owner_avatar,
            },
            company: row.company,
            website: row.website,
            location: row.location,
            status: row.status,
            bio: row.bio,
            github_username: row.github_username,
            skills: row.skills,
            experience: row.experience,
            education: row.education,
            created_at: row.created_at,
        }
    }
}

/// Splits a comma-separated skills string into trimmed entries, dropping
/// empty fragments.
pub(crate) fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skills_trims_each_fragment() {
        assert_eq!(parse_skills("go, rust"), vec!["go", "rust"]);
        assert_eq!(parse_skills("  a ,b , c  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_skills_drops_empty_fragments() {
        assert_eq!(parse_skills("go,,rust,"), vec!["go", "rust"]);
        assert!(parse_skills("").is_empty());
        assert!(parse_skills(" , ").is_empty());
    }

    #[test]
    fn parse_skills_preserves_order() {
        assert_eq!(parse_skills("c, b, a"), vec!["c", "b", "a"]);
    }
}
