use sqlx::{FromRow, SqlitePool};

use shared::types::jwt::Role;
use shared::types::user::{Image, UserProfile};

/// A `users` row, password hash included. Never serialized; convert with
/// `into_profile` before anything leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub avatar_public_id: Option<String>,
    pub avatar_url: String,
    pub created_at: i64,
}

impl UserRow {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            role: Role::parse(&self.role),
            id: self.id,
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            avatar: Image {
                public_id: self.avatar_public_id,
                url: self.avatar_url,
            },
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar: Image,
    pub created_at: i64,
}

const USER_COLUMNS: &str = "id, firstname, lastname, email, password_hash, role, \
                            avatar_public_id, avatar_url, created_at";

pub async fn insert_user(pool: &SqlitePool, user: &NewUser) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, firstname, lastname, email, password_hash, role,
                            avatar_public_id, avatar_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&user.id)
    .bind(&user.firstname)
    .bind(&user.lastname)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(&user.avatar.public_id)
    .bind(&user.avatar.url)
    .bind(user.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE email = ?1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users ORDER BY created_at, id",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

/// Write back the editable profile fields of `user`.
pub async fn update_user_profile(pool: &SqlitePool, user: &UserRow) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users
         SET firstname = ?2, lastname = ?3, email = ?4, avatar_public_id = ?5, avatar_url = ?6
         WHERE id = ?1",
    )
    .bind(&user.id)
    .bind(&user.firstname)
    .bind(&user.lastname)
    .bind(&user.email)
    .bind(&user.avatar_public_id)
    .bind(&user.avatar_url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::utils::{is_unique_violation, new_id};
    use crate::database::{connect_memory, create_tables};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            id: new_id(),
            firstname: "Grace".to_string(),
            lastname: "Hopper".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::User,
            avatar: Image {
                public_id: None,
                url: "https://example.com/default.jpg".to_string(),
            },
            created_at: 1_700_000_000,
        }
    }

    async fn pool() -> SqlitePool {
        let pool = connect_memory().await.unwrap();
        create_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn insert_and_find_by_email() {
        let pool = pool().await;
        let user = new_user("grace@example.com");
        insert_user(&pool, &user).await.unwrap();

        let row = find_user_by_email(&pool, "grace@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.id, user.id);
        assert_eq!(row.role(), Role::User);

        // Email lookups ignore case.
        assert!(
            find_user_by_email(&pool, "GRACE@example.com")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_schema() {
        let pool = pool().await;
        insert_user(&pool, &new_user("dup@example.com")).await.unwrap();
        let err = insert_user(&pool, &new_user("Dup@Example.com"))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn profile_never_carries_hash() {
        let pool = pool().await;
        let user = new_user("g@example.com");
        insert_user(&pool, &user).await.unwrap();
        let profile = get_user(&pool, &user.id).await.unwrap().unwrap().into_profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(!json.contains("public_id"));
    }

    #[tokio::test]
    async fn update_profile_fields() {
        let pool = pool().await;
        let user = new_user("old@example.com");
        insert_user(&pool, &user).await.unwrap();

        let mut row = get_user(&pool, &user.id).await.unwrap().unwrap();
        row.email = "new@example.com".to_string();
        row.avatar_public_id = Some("UserProfile/me".to_string());
        assert!(update_user_profile(&pool, &row).await.unwrap());

        let reread = get_user(&pool, &user.id).await.unwrap().unwrap();
        assert_eq!(reread.email, "new@example.com");
        assert_eq!(reread.avatar_public_id.as_deref(), Some("UserProfile/me"));
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let pool = pool().await;
        assert!(get_user(&pool, &new_id()).await.unwrap().is_none());
        assert!(list_users(&pool).await.unwrap().is_empty());
    }
}
