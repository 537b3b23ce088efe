use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;

use crate::db::pool_from_ctx;
use crate::error::{LodgeError, LodgeResult};
use crate::models::member::{Member, MemberForm};
use crate::models::GqlDateTime;
use crate::util::check_length;

/// An account managed by the host. Lodge members hang off of these.
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct User {
    pub id: i64,
    /// The name the host authenticates the user as
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the user may use the admin
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: GqlDateTime,
}

#[ComplexObject]
impl User {
    /// The user's lodge membership, edited inline with the user
    pub async fn member(&self, ctx: &Context<'_>) -> Result<Option<Member>> {
        let pool = pool_from_ctx(ctx);
        Ok(Member::for_user(self.id, pool).await?)
    }

    pub async fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

const SELECT_USER: &str = "SELECT id, username, email, first_name, last_name, is_staff, \
                           is_active, date_joined FROM user";

impl User {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("user", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_USER))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn with_username(username: &str, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_username_opt(username, pool)
            .await?
            .ok_or_else(|| LodgeError::NotFound(format!("No user named {}", username)))
    }

    pub async fn with_username_opt(username: &str, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE username = ?", SELECT_USER))
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!("{} ORDER BY last_name, first_name, username", SELECT_USER))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Creates the user, along with their membership when one is given.
    /// Either both are saved or neither is.
    pub async fn create(
        new_user: &UserForm,
        member: Option<&MemberForm>,
        joined: GqlDateTime,
        pool: &SqlitePool,
    ) -> LodgeResult<i64> {
        new_user.validate()?;
        if let Some(member) = member {
            member.validate()?;
        }
        if Self::with_username_opt(&new_user.username, pool)
            .await?
            .is_some()
        {
            return Err(LodgeError::Conflict(format!(
                "Another user is already named {}",
                new_user.username
            )));
        }

        let mut transaction = pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO user (username, email, first_name, last_name, is_staff, is_active, date_joined)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.is_staff)
        .bind(new_user.is_active)
        .bind(joined)
        .execute(&mut *transaction)
        .await?;
        let id = result.last_insert_rowid();
        if let Some(member) = member {
            Member::save_in(id, member, &mut transaction).await?;
        }
        transaction.commit().await?;
        tracing::info!(username = %new_user.username, "created user");

        Ok(id)
    }

    /// Updates the user. A given membership is created or updated in the
    /// same write; leaving it out keeps the current one.
    pub async fn update(
        id: i64,
        update: &UserForm,
        member: Option<&MemberForm>,
        pool: &SqlitePool,
    ) -> LodgeResult<()> {
        update.validate()?;
        if let Some(member) = member {
            member.validate()?;
        }
        let existing = Self::with_id(id, pool).await?;
        if existing.username != update.username
            && Self::with_username_opt(&update.username, pool)
                .await?
                .is_some()
        {
            return Err(LodgeError::Conflict(format!(
                "Another user is already named {}",
                update.username
            )));
        }

        let mut transaction = pool.begin().await?;
        sqlx::query(
            "UPDATE user SET username = ?, email = ?, first_name = ?, last_name = ?,
                 is_staff = ?, is_active = ?
             WHERE id = ?",
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.is_staff)
        .bind(update.is_active)
        .bind(id)
        .execute(&mut *transaction)
        .await?;
        if let Some(member) = member {
            Member::save_in(id, member, &mut transaction).await?;
        }
        transaction.commit().await?;

        Ok(())
    }

    /// Deletes the user along with their membership. Fails while the member
    /// still has scheduled work jobs or fines on record.
    pub async fn delete(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM user WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|err| match LodgeError::from(err) {
                LodgeError::Conflict(_) => LodgeError::Conflict(format!(
                    "User {} is a member with scheduled work jobs or fines on record",
                    id
                )),
                other => other,
            })?;
        tracing::info!(user = id, "deleted user");

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct UserForm {
    pub username: String,
    #[graphql(default)]
    pub email: String,
    #[graphql(default)]
    pub first_name: String,
    #[graphql(default)]
    pub last_name: String,
    #[graphql(default)]
    pub is_staff: bool,
    #[graphql(default = true)]
    pub is_active: bool,
}

impl UserForm {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_active: true,
        }
    }

    fn validate(&self) -> LodgeResult<()> {
        if self.username.trim().is_empty() {
            return Err(LodgeError::Invalid("A username is required".to_owned()));
        }

        check_length("username", &self.username, 150)
    }
}
