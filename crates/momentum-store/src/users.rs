//! User directory: identity resolution and profile sync

use sqlx::{Postgres, QueryBuilder};
use tracing::debug;

use crate::error::Result;
use crate::models::{DEFAULT_LANGUAGE, User, UserProfile};
use crate::store::Store;

const SELECT_USER: &str = "SELECT id, chat_id, username, first_name, last_name, credits, \
     language, last_reset, created_at, updated_at FROM users WHERE chat_id = $1";

/// Build the partial UPDATE for the supplied profile fields
///
/// Callers must not invoke this with an empty profile; `update_user`
/// short-circuits that case to a pure read.
fn update_statement<'a>(chat_id: i64, profile: &'a UserProfile) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE users SET ");
    {
        let mut fields = builder.separated(", ");
        if let Some(username) = &profile.username {
            fields.push("username = ");
            fields.push_bind_unseparated(username.as_str());
        }
        if let Some(first_name) = &profile.first_name {
            fields.push("first_name = ");
            fields.push_bind_unseparated(first_name.as_str());
        }
        if let Some(last_name) = &profile.last_name {
            fields.push("last_name = ");
            fields.push_bind_unseparated(last_name.as_str());
        }
        if let Some(language) = &profile.language {
            fields.push("language = ");
            fields.push_bind_unseparated(language.as_str());
        }
        fields.push("updated_at = now()");
    }
    builder.push(" WHERE chat_id = ");
    builder.push_bind(chat_id);
    builder
}

impl Store {
    /// Point lookup by external chat identity
    pub async fn get_user(&self, chat_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(SELECT_USER)
            .bind(chat_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    /// Insert a new user with a full credit balance
    ///
    /// Fails with a uniqueness violation when `chat_id` already exists;
    /// callers that went through `get_or_create_user` only hit that as a
    /// race between two first contacts.
    pub async fn create_user(&self, chat_id: i64, profile: &UserProfile) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (chat_id, username, first_name, last_name, language) \
             VALUES ($1, $2, $3, $4, COALESCE($5, $6)) \
             RETURNING id, chat_id, username, first_name, last_name, credits, \
                 language, last_reset, created_at, updated_at",
        )
        .bind(chat_id)
        .bind(profile.username.as_deref())
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.language.as_deref())
        .bind(DEFAULT_LANGUAGE)
        .fetch_one(self.pool())
        .await?;

        debug!(chat_id, user_id = user.id, "created user");
        Ok(user)
    }

    /// Partial profile update; only supplied fields are written
    ///
    /// An empty profile issues no UPDATE at all and returns the current
    /// record unchanged.
    pub async fn update_user(&self, chat_id: i64, profile: &UserProfile) -> Result<Option<User>> {
        if profile.is_empty() {
            return self.get_user(chat_id).await;
        }

        update_statement(chat_id, profile)
            .build()
            .execute(self.pool())
            .await?;
        self.get_user(chat_id).await
    }

    /// Resolve a chat identity, creating the record on first contact
    ///
    /// Existing users get their profile fields refreshed on every call, so
    /// display attributes track the chat platform.
    pub async fn get_or_create_user(&self, chat_id: i64, profile: &UserProfile) -> Result<User> {
        if self.get_user(chat_id).await?.is_some() {
            // The row cannot vanish: users are never deleted.
            match self.update_user(chat_id, profile).await? {
                Some(user) => Ok(user),
                None => self.create_user(chat_id, profile).await,
            }
        } else {
            self.create_user(chat_id, profile).await
        }
    }
}
