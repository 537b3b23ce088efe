use std::fmt;

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;

use crate::db::pool_from_ctx;
use crate::error::{LodgeError, LodgeResult};
use crate::models::member::Member;
use crate::models::schedule::ScheduledWorkJob;
use crate::models::GqlDate;
use crate::util::check_length;

/// A penalty for failing to do a work job or other house duty, payable to
/// the financial manager.
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct Fine {
    pub id: i64,
    /// What the member did (or didn't do)
    pub offense: String,
    /// How much the member owes. Zero means the fine is only a warning.
    pub amount: i32,
    /// Whether the fine has been paid
    pub paid: bool,

    #[graphql(skip)]
    pub member: i64,
}

/// What a fine actually charges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FineAmount {
    Warning,
    Charge(i32),
}

impl fmt::Display for FineAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FineAmount::Warning => write!(f, "Warning"),
            FineAmount::Charge(amount) => write!(f, "{}", amount),
        }
    }
}

#[ComplexObject]
impl Fine {
    /// "Warning" for a warning, otherwise the amount owed
    pub async fn display_amount(&self) -> String {
        self.charge().to_string()
    }

    pub async fn is_warning(&self) -> bool {
        self.charge() == FineAmount::Warning
    }

    /// The member who was fined
    pub async fn member(&self, ctx: &Context<'_>) -> Result<Member> {
        let pool = pool_from_ctx(ctx);
        Ok(Member::with_id(self.member, pool).await?)
    }

    /// Make-up jobs assigned alongside the fine
    pub async fn make_up_jobs(&self, ctx: &Context<'_>) -> Result<Vec<MakeUpJob>> {
        let pool = pool_from_ctx(ctx);
        Ok(MakeUpJob::for_fine(self.id, pool).await?)
    }
}

const SELECT_FINE: &str = "SELECT id, member, offense, amount, paid FROM fine";

impl Fine {
    /// A member can either be fined an amount or be given a warning.
    pub fn charge(&self) -> FineAmount {
        if self.amount == 0 {
            FineAmount::Warning
        } else {
            FineAmount::Charge(self.amount)
        }
    }

    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("fine", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_FINE))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!("{} ORDER BY id", SELECT_FINE))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn unpaid(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!("{} WHERE NOT paid ORDER BY id", SELECT_FINE))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn for_member(member: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!("{} WHERE member = ? ORDER BY id", SELECT_FINE))
            .bind(member)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn issue(form: &FineForm, pool: &SqlitePool) -> LodgeResult<i64> {
        check_length("offense", &form.offense, 50)?;
        if form.amount < 0 {
            return Err(LodgeError::Invalid(
                "A fine cannot be for a negative amount".to_owned(),
            ));
        }
        Member::with_id(form.member, pool).await?;

        let result = sqlx::query("INSERT INTO fine (member, offense, amount) VALUES (?, ?, ?)")
            .bind(form.member)
            .bind(&form.offense)
            .bind(form.amount)
            .execute(pool)
            .await?;
        tracing::info!(member = form.member, amount = form.amount, "issued fine");

        Ok(result.last_insert_rowid())
    }

    pub async fn set_paid(id: i64, paid: bool, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE fine SET paid = ? WHERE id = ?")
            .bind(paid)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Deletes the fine along with its make-up jobs.
    pub async fn delete(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM fine WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct FineForm {
    pub member: i64,
    pub offense: String,
    /// Leave at zero to only give a warning
    #[graphql(default)]
    pub amount: i32,
}

/// Extra work assigned to a member who missed a work job
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct MakeUpJob {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date_due: GqlDate,
    pub completed: bool,

    #[graphql(skip)]
    pub missed_workjob: i64,
    #[graphql(skip)]
    pub fine: i64,
}

#[ComplexObject]
impl MakeUpJob {
    /// The work job that was missed
    pub async fn missed_workjob(&self, ctx: &Context<'_>) -> Result<ScheduledWorkJob> {
        let pool = pool_from_ctx(ctx);
        Ok(ScheduledWorkJob::with_id(self.missed_workjob, pool).await?)
    }

    pub async fn fine(&self, ctx: &Context<'_>) -> Result<Fine> {
        let pool = pool_from_ctx(ctx);
        Ok(Fine::with_id(self.fine, pool).await?)
    }
}

const SELECT_MAKE_UP_JOB: &str =
    "SELECT id, title, description, missed_workjob, date_due, fine, completed FROM make_up_job";

impl MakeUpJob {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("make-up job", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_MAKE_UP_JOB))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pending_only: bool, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        let filter = if pending_only { "WHERE NOT completed" } else { "" };

        sqlx::query_as(&format!("{} {} ORDER BY date_due, id", SELECT_MAKE_UP_JOB, filter))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn for_fine(fine: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!(
            "{} WHERE fine = ? ORDER BY date_due, id",
            SELECT_MAKE_UP_JOB
        ))
        .bind(fine)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Assigns a make-up job for a missed work job. The fine must have been
    /// issued to the member who missed it.
    pub async fn assign(form: &MakeUpJobForm, pool: &SqlitePool) -> LodgeResult<i64> {
        check_length("title", &form.title, 30)?;
        check_length("description", &form.description, 200)?;
        let missed = ScheduledWorkJob::with_id(form.missed_workjob, pool).await?;
        let fine = Fine::with_id(form.fine, pool).await?;
        if missed.member != fine.member {
            return Err(LodgeError::Invalid(format!(
                "Fine {} was issued to a different member than the one who missed \
                 scheduled work job {}",
                fine.id, missed.id
            )));
        }

        let result = sqlx::query(
            "INSERT INTO make_up_job (title, description, missed_workjob, date_due, fine)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.missed_workjob)
        .bind(form.date_due)
        .bind(form.fine)
        .execute(pool)
        .await?;
        tracing::info!(member = fine.member, fine = fine.id, "assigned make-up job");

        Ok(result.last_insert_rowid())
    }

    pub async fn set_completed(id: i64, completed: bool, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE make_up_job SET completed = ? WHERE id = ?")
            .bind(completed)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM make_up_job WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct MakeUpJobForm {
    pub title: String,
    pub description: String,
    pub missed_workjob: i64,
    pub date_due: GqlDate,
    pub fine: i64,
}
