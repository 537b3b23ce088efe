use async_graphql::{Context, Object, Result};

use crate::db::pool_from_ctx;
use crate::graphql::guards::{current_member, LoggedIn, Staff};
use crate::graphql::SUCCESS_MESSAGE;
use crate::models::schedule::{ScheduleForm, ScheduledWorkJob};
use crate::models::GqlDate;

#[derive(Default)]
pub struct ScheduleQuery;

#[Object]
impl ScheduleQuery {
    #[graphql(guard = "LoggedIn")]
    pub async fn scheduled_work_job(&self, ctx: &Context<'_>, id: i64) -> Result<ScheduledWorkJob> {
        let pool = pool_from_ctx(ctx);
        Ok(ScheduledWorkJob::with_id(id, pool).await?)
    }

    /// Every work job due from `from` through `to`
    #[graphql(guard = "LoggedIn")]
    pub async fn schedule(
        &self,
        ctx: &Context<'_>,
        from: GqlDate,
        to: GqlDate,
    ) -> Result<Vec<ScheduledWorkJob>> {
        let pool = pool_from_ctx(ctx);
        Ok(ScheduledWorkJob::between(from.0, to.0, pool).await?)
    }

    /// The current user's own work jobs
    #[graphql(guard = "LoggedIn")]
    pub async fn my_work_jobs(&self, ctx: &Context<'_>) -> Result<Vec<ScheduledWorkJob>> {
        let pool = pool_from_ctx(ctx);
        let member = current_member(ctx).await?;
        Ok(ScheduledWorkJob::for_member(member.id, pool).await?)
    }
}

#[derive(Default)]
pub struct ScheduleMutation;

#[Object]
impl ScheduleMutation {
    #[graphql(guard = "Staff")]
    pub async fn schedule_work_job(
        &self,
        ctx: &Context<'_>,
        assignment: ScheduleForm,
    ) -> Result<ScheduledWorkJob> {
        let pool = pool_from_ctx(ctx);
        let id = ScheduledWorkJob::schedule(&assignment, pool).await?;

        Ok(ScheduledWorkJob::with_id(id, pool).await?)
    }

    /// Schedules a member for a work job on each of its days in the week
    /// starting on `week_of` (a Monday)
    #[graphql(guard = "Staff")]
    pub async fn schedule_week(
        &self,
        ctx: &Context<'_>,
        member: i64,
        work_job: i64,
        week_of: GqlDate,
    ) -> Result<Vec<ScheduledWorkJob>> {
        let pool = pool_from_ctx(ctx);
        let ids = ScheduledWorkJob::schedule_week(member, work_job, week_of.0, pool).await?;

        let mut scheduled = Vec::with_capacity(ids.len());
        for id in ids {
            scheduled.push(ScheduledWorkJob::with_id(id, pool).await?);
        }

        Ok(scheduled)
    }

    #[graphql(guard = "Staff")]
    pub async fn reassign_work_job(
        &self,
        ctx: &Context<'_>,
        id: i64,
        member: i64,
    ) -> Result<ScheduledWorkJob> {
        let pool = pool_from_ctx(ctx);
        ScheduledWorkJob::reassign(id, member, pool).await?;

        Ok(ScheduledWorkJob::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn unschedule_work_job(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        ScheduledWorkJob::unschedule(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
