use async_graphql::{Context, Object, Result};

use crate::db::pool_from_ctx;
use crate::graphql::guards::{LoggedIn, Staff};
use crate::graphql::SUCCESS_MESSAGE;
use crate::models::work_job::{
    DayOfWeek, ResponsibilityForm, WorkJob, WorkJobForm, WorkJobResponsibility,
};

#[derive(Default)]
pub struct WorkJobQuery;

#[Object]
impl WorkJobQuery {
    #[graphql(guard = "LoggedIn")]
    pub async fn work_job(&self, ctx: &Context<'_>, id: i64) -> Result<WorkJob> {
        let pool = pool_from_ctx(ctx);
        Ok(WorkJob::with_id(id, pool).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn work_jobs(&self, ctx: &Context<'_>) -> Result<Vec<WorkJob>> {
        let pool = pool_from_ctx(ctx);
        Ok(WorkJob::all(pool).await?)
    }

    pub async fn days_of_week(&self, ctx: &Context<'_>) -> Result<Vec<DayOfWeek>> {
        let pool = pool_from_ctx(ctx);
        Ok(DayOfWeek::all(pool).await?)
    }
}

#[derive(Default)]
pub struct WorkJobMutation;

#[Object]
impl WorkJobMutation {
    #[graphql(guard = "Staff")]
    pub async fn create_work_job(&self, ctx: &Context<'_>, work_job: WorkJobForm) -> Result<WorkJob> {
        let pool = pool_from_ctx(ctx);
        let id = WorkJob::create(&work_job, pool).await?;

        Ok(WorkJob::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn update_work_job(
        &self,
        ctx: &Context<'_>,
        id: i64,
        work_job: WorkJobForm,
    ) -> Result<WorkJob> {
        let pool = pool_from_ctx(ctx);
        WorkJob::update(id, &work_job, pool).await?;

        Ok(WorkJob::with_id(id, pool).await?)
    }

    /// Replaces the days of the week the job is done on
    #[graphql(guard = "Staff")]
    pub async fn set_work_job_days(
        &self,
        ctx: &Context<'_>,
        id: i64,
        days: Vec<i64>,
    ) -> Result<WorkJob> {
        let pool = pool_from_ctx(ctx);
        WorkJob::set_days(id, &days, pool).await?;

        Ok(WorkJob::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn delete_work_job(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        WorkJob::delete(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "Staff")]
    pub async fn add_responsibility(
        &self,
        ctx: &Context<'_>,
        work_job: i64,
        responsibility: ResponsibilityForm,
    ) -> Result<WorkJobResponsibility> {
        let pool = pool_from_ctx(ctx);
        let id = WorkJobResponsibility::add(work_job, &responsibility, pool).await?;

        Ok(WorkJobResponsibility::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn update_responsibility(
        &self,
        ctx: &Context<'_>,
        id: i64,
        responsibility: ResponsibilityForm,
    ) -> Result<WorkJobResponsibility> {
        let pool = pool_from_ctx(ctx);
        WorkJobResponsibility::update(id, &responsibility, pool).await?;

        Ok(WorkJobResponsibility::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn remove_responsibility(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        WorkJobResponsibility::remove(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
