use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One endorsement on a post. At most one per user, newest first;
/// enforced by a pre-check on mutation, not a storage constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Like {
    pub user: Uuid,
}

/// Post document. `name` and `avatar` are copied from the author at
/// creation time and never synced with later profile edits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Json<Vec<Like>>,
    pub created_at: OffsetDateTime,
}

const POST_COLUMNS: &str = "id, user_id, text, name, avatar, likes, created_at";

impl Post {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        text: &str,
        name: &str,
        avatar: &str,
    ) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (user_id, text, name, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(text)
        .bind(name)
        .bind(avatar)
        .fetch_one(db)
        .await
    }

    pub async fn list(db: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn save_likes(db: &PgPool, id: Uuid, likes: &[Like]) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE posts SET likes = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(likes))
            .execute(db)
            .await?;
        Ok(())
    }
}

/// True when the user already appears in the likes list.
pub(crate) fn has_liked(likes: &[Like], user_id: Uuid) -> bool {
    likes.iter().any(|l| l.user == user_id)
}

/// Prepends the user's like.
pub(crate) fn add_like(likes: &mut Vec<Like>, user_id: Uuid) {
    likes.insert(0, Like { user: user_id });
}

/// Removes the like belonging to the user, keyed by the user's own
/// reference.
pub(crate) fn remove_like(likes: &mut Vec<Like>, user_id: Uuid) {
    if let Some(pos) = likes.iter().position(|l| l.user == user_id) {
        likes.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_like_prepends() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut likes = Vec::new();
        add_like(&mut likes, first);
        add_like(&mut likes, second);
        assert_eq!(likes[0].user, second);
        assert_eq!(likes[1].user, first);
    }

    #[test]
    fn has_liked_detects_membership() {
        let user = Uuid::new_v4();
        let mut likes = Vec::new();
        assert!(!has_liked(&likes, user));
        add_like(&mut likes, user);
        assert!(has_liked(&likes, user));
        assert!(!has_liked(&likes, Uuid::new_v4()));
    }

    #[test]
    fn remove_like_targets_the_callers_entry() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut likes = Vec::new();
        add_like(&mut likes, alice);
        add_like(&mut likes, bob);
        remove_like(&mut likes, alice);
        assert_eq!(likes, vec![Like { user: bob }]);
    }

    #[test]
    fn remove_like_for_absent_user_is_a_noop() {
        let alice = Uuid::new_v4();
        let mut likes = Vec::new();
        add_like(&mut likes, alice);
        remove_like(&mut likes, Uuid::new_v4());
        assert_eq!(likes.len(), 1);
    }
}
