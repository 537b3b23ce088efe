use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::{Sqlite, SqlitePool, Transaction};
use time::Weekday;

use crate::db::pool_from_ctx;
use crate::error::{LodgeError, LodgeResult};
use crate::models::GqlTime;
use crate::util::check_length;

/// A recurring chore. On each of its days it must be started at
/// `time_start` and finished by `time_due`.
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct WorkJob {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub time_start: GqlTime,
    pub time_due: GqlTime,
    /// How long the job takes, in minutes
    pub length: i32,
}

#[ComplexObject]
impl WorkJob {
    /// The days of the week the job is done on
    pub async fn days(&self, ctx: &Context<'_>) -> Result<Vec<DayOfWeek>> {
        let pool = pool_from_ctx(ctx);
        Ok(DayOfWeek::for_work_job(self.id, pool).await?)
    }

    /// What has to get done, most important first
    pub async fn responsibilities(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<WorkJobResponsibility>> {
        let pool = pool_from_ctx(ctx);
        Ok(WorkJobResponsibility::for_work_job(self.id, pool).await?)
    }
}

const SELECT_WORK_JOB: &str =
    "SELECT id, title, description, time_start, time_due, length FROM work_job";

impl WorkJob {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("work job", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_WORK_JOB))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!("{} ORDER BY time_start, title", SELECT_WORK_JOB))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Creates the job along with its days. Either both are saved or
    /// neither is.
    pub async fn create(form: &WorkJobForm, pool: &SqlitePool) -> LodgeResult<i64> {
        form.validate()?;

        let mut transaction = pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO work_job (title, description, time_start, time_due, length)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.time_start)
        .bind(form.time_due)
        .bind(form.length)
        .execute(&mut *transaction)
        .await?;
        let id = result.last_insert_rowid();
        Self::replace_days(id, &form.days, &mut transaction).await?;
        transaction.commit().await?;
        tracing::info!(work_job = id, title = %form.title, "created work job");

        Ok(id)
    }

    pub async fn update(id: i64, form: &WorkJobForm, pool: &SqlitePool) -> LodgeResult<()> {
        form.validate()?;
        Self::with_id(id, pool).await?;

        let mut transaction = pool.begin().await?;
        sqlx::query(
            "UPDATE work_job SET title = ?, description = ?, time_start = ?, time_due = ?, length = ?
             WHERE id = ?",
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.time_start)
        .bind(form.time_due)
        .bind(form.length)
        .bind(id)
        .execute(&mut *transaction)
        .await?;
        Self::replace_days(id, &form.days, &mut transaction).await?;
        transaction.commit().await?;

        Ok(())
    }

    /// Replaces the days the job is done on.
    pub async fn set_days(id: i64, days: &[i64], pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        let mut transaction = pool.begin().await?;
        Self::replace_days(id, days, &mut transaction).await?;
        transaction.commit().await?;

        Ok(())
    }

    async fn replace_days(
        id: i64,
        days: &[i64],
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> LodgeResult<()> {
        sqlx::query("DELETE FROM work_job_day WHERE work_job = ?")
            .bind(id)
            .execute(&mut **transaction)
            .await?;
        for day in days {
            sqlx::query("INSERT OR IGNORE INTO work_job_day (work_job, day) VALUES (?, ?)")
                .bind(id)
                .bind(day)
                .execute(&mut **transaction)
                .await
                .map_err(|err| match LodgeError::from(err) {
                    LodgeError::Conflict(_) => {
                        LodgeError::Invalid(format!("No day of the week with id {}", day))
                    }
                    other => other,
                })?;
        }

        Ok(())
    }

    /// Deletes the job with its days and responsibilities. Fails while any
    /// occurrence of it is still scheduled.
    pub async fn delete(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM work_job WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|err| match LodgeError::from(err) {
                LodgeError::Conflict(_) => LodgeError::Conflict(format!(
                    "Work job {} is still scheduled and cannot be deleted",
                    id
                )),
                other => other,
            })?;

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct WorkJobForm {
    pub title: String,
    pub description: String,
    pub time_start: GqlTime,
    pub time_due: GqlTime,
    /// In minutes
    pub length: i32,
    /// The ids of the days of the week the job is done on
    #[graphql(default)]
    pub days: Vec<i64>,
}

impl WorkJobForm {
    fn validate(&self) -> LodgeResult<()> {
        check_length("title", &self.title, 30)?;
        check_length("description", &self.description, 200)?;
        if self.length < 0 {
            return Err(LodgeError::Invalid(
                "A work job cannot take a negative amount of time".to_owned(),
            ));
        }

        Ok(())
    }
}

/// A day a work job can be done on
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
pub struct DayOfWeek {
    pub id: i64,
    pub day: String,
}

impl DayOfWeek {
    pub async fn all(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as("SELECT id, day FROM days_of_week ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn for_work_job(work_job: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT days_of_week.id, days_of_week.day FROM days_of_week
             INNER JOIN work_job_day ON work_job_day.day = days_of_week.id
             WHERE work_job_day.work_job = ? ORDER BY days_of_week.id",
        )
        .bind(work_job)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// The weekday this day names, if it names one.
    pub fn weekday(&self) -> Option<Weekday> {
        match self.day.to_lowercase().as_str() {
            "monday" | "mon" => Some(Weekday::Monday),
            "tuesday" | "tue" | "tues" => Some(Weekday::Tuesday),
            "wednesday" | "wed" => Some(Weekday::Wednesday),
            "thursday" | "thu" | "thurs" => Some(Weekday::Thursday),
            "friday" | "fri" => Some(Weekday::Friday),
            "saturday" | "sat" => Some(Weekday::Saturday),
            "sunday" | "sun" => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

/// One thing to get done during a work job
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
pub struct WorkJobResponsibility {
    pub id: i64,
    pub description: String,
    /// Lower numbers get done first
    pub priority: i32,

    #[graphql(skip)]
    pub work_job: i64,
}

impl WorkJobResponsibility {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        sqlx::query_as(
            "SELECT id, work_job, description, priority FROM work_job_responsibility WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| LodgeError::not_found("responsibility", id))
    }

    pub async fn for_work_job(work_job: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT id, work_job, description, priority FROM work_job_responsibility
             WHERE work_job = ? ORDER BY priority, id",
        )
        .bind(work_job)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn add(
        work_job: i64,
        form: &ResponsibilityForm,
        pool: &SqlitePool,
    ) -> LodgeResult<i64> {
        check_length("description", &form.description, 200)?;
        WorkJob::with_id(work_job, pool).await?;

        let result = sqlx::query(
            "INSERT INTO work_job_responsibility (work_job, description, priority) VALUES (?, ?, ?)",
        )
        .bind(work_job)
        .bind(&form.description)
        .bind(form.priority)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(id: i64, form: &ResponsibilityForm, pool: &SqlitePool) -> LodgeResult<()> {
        check_length("description", &form.description, 200)?;
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE work_job_responsibility SET description = ?, priority = ? WHERE id = ?")
            .bind(&form.description)
            .bind(form.priority)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn remove(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM work_job_responsibility WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct ResponsibilityForm {
    pub description: String,
    pub priority: i32,
}
