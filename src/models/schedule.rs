use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::{Sqlite, SqlitePool, Transaction};
use time::{Date, Duration, Weekday};

use crate::db::pool_from_ctx;
use crate::error::{LodgeError, LodgeResult};
use crate::models::member::Member;
use crate::models::work_job::{DayOfWeek, WorkJob};
use crate::models::GqlDate;

/// One dated occurrence of a work job, assigned to a member
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct ScheduledWorkJob {
    pub id: i64,
    pub date_due: GqlDate,

    #[graphql(skip)]
    pub member: i64,
    #[graphql(skip)]
    pub work_job: i64,
}

#[ComplexObject]
impl ScheduledWorkJob {
    /// The member responsible for the job
    pub async fn member(&self, ctx: &Context<'_>) -> Result<Member> {
        let pool = pool_from_ctx(ctx);
        Ok(Member::with_id(self.member, pool).await?)
    }

    pub async fn work_job(&self, ctx: &Context<'_>) -> Result<WorkJob> {
        let pool = pool_from_ctx(ctx);
        Ok(WorkJob::with_id(self.work_job, pool).await?)
    }
}

const SELECT_SCHEDULED: &str = "SELECT id, date_due, member, work_job FROM scheduled_work_job";

impl ScheduledWorkJob {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("scheduled work job", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_SCHEDULED))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Reads the job inside an open transaction.
    pub(crate) async fn with_id_in(
        id: i64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> LodgeResult<Self> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_SCHEDULED))
            .bind(id)
            .fetch_optional(&mut **transaction)
            .await?
            .ok_or_else(|| LodgeError::not_found("scheduled work job", id))
    }

    pub async fn for_member(member: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!(
            "{} WHERE member = ? ORDER BY date_due, id",
            SELECT_SCHEDULED
        ))
        .bind(member)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Everything due from `from` through `to`, inclusive.
    pub async fn between(from: Date, to: Date, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!(
            "{} WHERE date_due >= ? AND date_due <= ? ORDER BY date_due, id",
            SELECT_SCHEDULED
        ))
        .bind(GqlDate(from))
        .bind(GqlDate(to))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn schedule(form: &ScheduleForm, pool: &SqlitePool) -> LodgeResult<i64> {
        Member::with_id(form.member, pool).await?;
        WorkJob::with_id(form.work_job, pool).await?;

        let result =
            sqlx::query("INSERT INTO scheduled_work_job (date_due, member, work_job) VALUES (?, ?, ?)")
                .bind(form.date_due)
                .bind(form.member)
                .bind(form.work_job)
                .execute(pool)
                .await?;
        tracing::debug!(
            member = form.member,
            work_job = form.work_job,
            date_due = ?form.date_due.0,
            "scheduled work job"
        );

        Ok(result.last_insert_rowid())
    }

    /// Schedules the member for every day of the work job during the week
    /// starting on `week_of`, which must be a Monday.
    pub async fn schedule_week(
        member: i64,
        work_job: i64,
        week_of: Date,
        pool: &SqlitePool,
    ) -> LodgeResult<Vec<i64>> {
        if week_of.weekday() != Weekday::Monday {
            return Err(LodgeError::Invalid(format!(
                "Weeks start on a Monday, but {} is a {}",
                week_of,
                week_of.weekday()
            )));
        }

        Member::with_id(member, pool).await?;
        WorkJob::with_id(work_job, pool).await?;
        let days = DayOfWeek::for_work_job(work_job, pool).await?;

        let mut transaction = pool.begin().await?;
        let mut scheduled = Vec::new();
        for weekday in days.iter().filter_map(DayOfWeek::weekday) {
            let date_due = week_of + Duration::days(weekday.number_days_from_monday() as i64);
            let result = sqlx::query(
                "INSERT INTO scheduled_work_job (date_due, member, work_job) VALUES (?, ?, ?)",
            )
            .bind(GqlDate(date_due))
            .bind(member)
            .bind(work_job)
            .execute(&mut *transaction)
            .await?;
            scheduled.push(result.last_insert_rowid());
        }
        transaction.commit().await?;
        tracing::debug!(member, work_job, week_of = ?week_of, "scheduled week");

        Ok(scheduled)
    }

    /// Reassigns the job to another member.
    pub async fn reassign(id: i64, member: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;
        Member::with_id(member, pool).await?;

        sqlx::query("UPDATE scheduled_work_job SET member = ? WHERE id = ?")
            .bind(member)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Removes the job from the schedule, along with any trades naming it.
    /// Fails once a make-up job has been assigned for missing it.
    pub async fn unschedule(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM scheduled_work_job WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|err| match LodgeError::from(err) {
                LodgeError::Conflict(_) => LodgeError::Conflict(format!(
                    "Scheduled work job {} has a make-up job and cannot be removed",
                    id
                )),
                other => other,
            })?;

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct ScheduleForm {
    pub date_due: GqlDate,
    pub member: i64,
    pub work_job: i64,
}
