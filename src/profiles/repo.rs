use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One position in the profile's work history. Entries are kept newest
/// first; `id` is generated server-side and used for removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "from")]
    pub from_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One position in the profile's education history, same shape rules as
/// [`ExperienceEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    #[serde(rename = "from")]
    pub from_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Profile document. Experience, education and skills are embedded in the
/// row and rewritten wholesale on mutation (read-modify-write, no
/// optimistic concurrency).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
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

/// Profile row joined with its owner's display fields.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileOwnerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_name: String,
    pub owner_avatar: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub experience: Json<Vec<ExperienceEntry>>,
    pub education: Json<Vec<EducationEntry>>,
    pub created_at: OffsetDateTime,
}

/// Field set accepted by the upsert. `None` optionals leave an existing
/// profile's value untouched.
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
}

const PROFILE_COLUMNS: &str = "id, user_id, company, website, location, status, bio, \
     github_username, skills, experience, education, created_at";

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (user_id, company, website, location, status, bio,
                                  github_username, skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                company = COALESCE(EXCLUDED.company, profiles.company),
                website = COALESCE(EXCLUDED.website, profiles.website),
                location = COALESCE(EXCLUDED.location, profiles.location),
                status = EXCLUDED.status,
                bio = COALESCE(EXCLUDED.bio, profiles.bio),
                github_username = COALESCE(EXCLUDED.github_username, profiles.github_username),
                skills = EXCLUDED.skills
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&fields.company)
        .bind(&fields.website)
        .bind(&fields.location)
        .bind(&fields.status)
        .bind(&fields.bio)
        .bind(&fields.github_username)
        .bind(&fields.skills)
        .fetch_one(db)
        .await
    }

    pub async fn save_experience(
        db: &PgPool,
        profile_id: Uuid,
        entries: &[ExperienceEntry],
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles SET experience = $2 WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(profile_id)
        .bind(Json(entries))
        .fetch_one(db)
        .await
    }

    pub async fn save_education(
        db: &PgPool,
        profile_id: Uuid,
        entries: &[EducationEntry],
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles SET education = $2 WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(profile_id)
        .bind(Json(entries))
        .fetch_one(db)
        .await
    }
}

const OWNER_COLUMNS: &str = "p.id, p.user_id, u.name AS owner_name, u.avatar AS owner_avatar, \
     p.company, p.website, p.location, p.status, p.bio, p.github_username, \
     p.skills, p.experience, p.education, p.created_at";

pub async fn find_with_owner_by_user(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Option<ProfileOwnerRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileOwnerRow>(&format!(
        "SELECT {OWNER_COLUMNS} FROM profiles p JOIN users u ON u.id = p.user_id \
         WHERE p.user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn list_with_owner(db: &PgPool) -> Result<Vec<ProfileOwnerRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileOwnerRow>(&format!(
        "SELECT {OWNER_COLUMNS} FROM profiles p JOIN users u ON u.id = p.user_id \
         ORDER BY p.created_at DESC"
    ))
    .fetch_all(db)
    .await
}

/// Removes the caller's profile and account in one transaction. Posts go
/// with the user via the foreign-key cascade.
pub async fn delete_profile_and_user(db: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

/// Drops the entry with the given sub-id, if any. An unknown id leaves the
/// list untouched.
pub(crate) fn remove_entry<T>(entries: &mut Vec<T>, id: Uuid, entry_id: impl Fn(&T) -> Uuid) {
    if let Some(pos) = entries.iter().position(|e| entry_id(e) == id) {
        entries.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> ExperienceEntry {
        ExperienceEntry {
            id: Uuid::new_v4(),
            title: title.into(),
            company: "Acme".into(),
            location: None,
            from_date: "2020-01-01".into(),
            to: None,
            current: false,
            description: None,
        }
    }

    #[test]
    fn remove_entry_drops_only_the_matching_id() {
        let mut entries = vec![entry("Eng"), entry("Lead")];
        let target = entries[1].id;
        remove_entry(&mut entries, target, |e| e.id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Eng");
    }

    #[test]
    fn remove_entry_with_unknown_id_is_a_noop() {
        let mut entries = vec![entry("Eng"), entry("Lead")];
        let before: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        remove_entry(&mut entries, Uuid::new_v4(), |e| e.id);
        let after: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn add_then_remove_restores_the_list() {
        let mut entries = vec![entry("Old")];
        let original: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let added = entry("New");
        let added_id = added.id;
        entries.insert(0, added);
        assert_eq!(entries[0].title, "New");
        remove_entry(&mut entries, added_id, |e| e.id);
        let restored: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        assert_eq!(original, restored);
    }

    #[test]
    fn experience_entry_serializes_from_date_as_from() {
        let e = entry("Eng");
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("from").is_some());
        assert!(json.get("from_date").is_none());
    }
}
