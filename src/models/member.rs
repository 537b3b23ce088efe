use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject};
use sqlx::{Sqlite, SqlitePool, Transaction};
use time::Date;

use crate::config::Config;
use crate::db::pool_from_ctx;
use crate::error::{LodgeError, LodgeResult};
use crate::models::fine::Fine;
use crate::models::position::{Position, PositionHeld};
use crate::models::schedule::ScheduledWorkJob;
use crate::models::user::User;
use crate::models::GqlDate;
use crate::util::{check_length, today};

/// A member of the lodge
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct Member {
    pub id: i64,
    /// What the member likes to be called
    pub nickname: Option<String>,
    /// When the member joined the lodge
    pub member_since: Option<GqlDate>,
    /// The member's year in school
    pub year: YearInSchool,

    #[graphql(skip)]
    pub user: i64,
}

#[derive(Enum, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
pub enum YearInSchool {
    #[sqlx(rename = "FR")]
    Freshman,
    #[sqlx(rename = "SO")]
    Sophomore,
    #[sqlx(rename = "JR")]
    Junior,
    #[sqlx(rename = "SR")]
    Senior,
    #[sqlx(rename = "GR")]
    Graduate,
    #[sqlx(rename = "OT")]
    Other,
    #[sqlx(rename = "NA")]
    NotApplicable,
}

impl YearInSchool {
    pub fn label(&self) -> &'static str {
        match self {
            YearInSchool::Freshman => "Freshman",
            YearInSchool::Sophomore => "Sophomore",
            YearInSchool::Junior => "Junior",
            YearInSchool::Senior => "Senior",
            YearInSchool::Graduate => "Graduate",
            YearInSchool::Other => "Other",
            YearInSchool::NotApplicable => "Not Applicable",
        }
    }
}

#[ComplexObject]
impl Member {
    /// The account this membership belongs to
    pub async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        let pool = pool_from_ctx(ctx);
        Ok(User::with_id(self.user, pool).await?)
    }

    /// The member's year in school, spelled out
    pub async fn year_label(&self) -> &'static str {
        self.year.label()
    }

    /// The positions the member holds today
    pub async fn current_positions(&self, ctx: &Context<'_>) -> Result<Vec<Position>> {
        let pool = pool_from_ctx(ctx);
        let config = ctx.data_unchecked::<Config>();
        Ok(Self::current_positions_on(self.id, today(config.utc_offset), pool).await?)
    }

    /// Every position the member has held, past and present
    pub async fn positions_held(&self, ctx: &Context<'_>) -> Result<Vec<PositionHeld>> {
        let pool = pool_from_ctx(ctx);
        Ok(PositionHeld::for_member(self.id, pool).await?)
    }

    /// The work jobs scheduled for the member
    pub async fn scheduled_work_jobs(&self, ctx: &Context<'_>) -> Result<Vec<ScheduledWorkJob>> {
        let pool = pool_from_ctx(ctx);
        Ok(ScheduledWorkJob::for_member(self.id, pool).await?)
    }

    /// The fines issued to the member
    pub async fn fines(&self, ctx: &Context<'_>) -> Result<Vec<Fine>> {
        let pool = pool_from_ctx(ctx);
        Ok(Fine::for_member(self.id, pool).await?)
    }
}

const SELECT_MEMBER: &str = "SELECT id, user, nickname, member_since, year FROM member";

impl Member {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("member", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_MEMBER))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn for_user(user: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE user = ?", SELECT_MEMBER))
            .bind(user)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT member.id, member.user, member.nickname, member.member_since, member.year
             FROM member INNER JOIN user ON user.id = member.user
             ORDER BY user.last_name, user.first_name, user.username",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Creates the membership for `user`, or updates it if one exists.
    pub async fn save_for_user(user: i64, form: &MemberForm, pool: &SqlitePool) -> LodgeResult<i64> {
        form.validate()?;
        User::with_id(user, pool).await?;

        let mut transaction = pool.begin().await?;
        let id = Self::save_in(user, form, &mut transaction).await?;
        transaction.commit().await?;

        Ok(id)
    }

    /// Upserts the membership as part of a larger write. The form must
    /// already be validated.
    pub(crate) async fn save_in(
        user: i64,
        form: &MemberForm,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> LodgeResult<i64> {
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM member WHERE user = ?")
            .bind(user)
            .fetch_optional(&mut **transaction)
            .await?;

        if let Some(existing) = existing {
            sqlx::query("UPDATE member SET nickname = ?, member_since = ?, year = ? WHERE id = ?")
                .bind(&form.nickname)
                .bind(form.member_since)
                .bind(form.year)
                .bind(existing)
                .execute(&mut **transaction)
                .await?;

            Ok(existing)
        } else {
            let result = sqlx::query(
                "INSERT INTO member (user, nickname, member_since, year) VALUES (?, ?, ?, ?)",
            )
            .bind(user)
            .bind(&form.nickname)
            .bind(form.member_since)
            .bind(form.year)
            .execute(&mut **transaction)
            .await?;
            tracing::info!(user, "registered member");

            Ok(result.last_insert_rowid())
        }
    }

    /// The positions held by the member through an active assignment whose
    /// terms span `on`.
    pub async fn current_positions_on(
        member: i64,
        on: Date,
        pool: &SqlitePool,
    ) -> LodgeResult<Vec<Position>> {
        sqlx::query_as(
            "SELECT DISTINCT position.id, position.title, position.description,
                 position.seniority_points, position.is_exec, position.percent_off_workjobs
             FROM position
             INNER JOIN position_held ON position_held.position = position.id
             INNER JOIN term AS begin_term ON begin_term.id = position_held.begin_term
             INNER JOIN term AS end_term ON end_term.id = position_held.end_term
             WHERE position_held.member = ? AND position_held.is_active
                 AND begin_term.begin_date <= ? AND end_term.end_date >= ?
             ORDER BY position.title",
        )
        .bind(member)
        .bind(GqlDate(on))
        .bind(GqlDate(on))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct MemberForm {
    pub nickname: Option<String>,
    pub member_since: Option<GqlDate>,
    pub year: YearInSchool,
}

impl MemberForm {
    pub fn validate(&self) -> LodgeResult<()> {
        match &self.nickname {
            Some(nickname) => check_length("nickname", nickname, 30),
            None => Ok(()),
        }
    }
}
