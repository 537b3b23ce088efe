use async_graphql::{Context, Object, Result};

use crate::db::pool_from_ctx;
use crate::graphql::guards::{current_member, LoggedIn, Staff};
use crate::graphql::SUCCESS_MESSAGE;
use crate::models::fine::{Fine, FineForm, MakeUpJob, MakeUpJobForm};

#[derive(Default)]
pub struct FineQuery;

#[Object]
impl FineQuery {
    #[graphql(guard = "Staff")]
    pub async fn fine(&self, ctx: &Context<'_>, id: i64) -> Result<Fine> {
        let pool = pool_from_ctx(ctx);
        Ok(Fine::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn fines(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] unpaid_only: bool,
    ) -> Result<Vec<Fine>> {
        let pool = pool_from_ctx(ctx);
        if unpaid_only {
            Ok(Fine::unpaid(pool).await?)
        } else {
            Ok(Fine::all(pool).await?)
        }
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn my_fines(&self, ctx: &Context<'_>) -> Result<Vec<Fine>> {
        let pool = pool_from_ctx(ctx);
        let member = current_member(ctx).await?;
        Ok(Fine::for_member(member.id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn make_up_job(&self, ctx: &Context<'_>, id: i64) -> Result<MakeUpJob> {
        let pool = pool_from_ctx(ctx);
        Ok(MakeUpJob::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn make_up_jobs(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] pending_only: bool,
    ) -> Result<Vec<MakeUpJob>> {
        let pool = pool_from_ctx(ctx);
        Ok(MakeUpJob::all(pending_only, pool).await?)
    }
}

#[derive(Default)]
pub struct FineMutation;

#[Object]
impl FineMutation {
    #[graphql(guard = "Staff")]
    pub async fn issue_fine(&self, ctx: &Context<'_>, fine: FineForm) -> Result<Fine> {
        let pool = pool_from_ctx(ctx);
        let id = Fine::issue(&fine, pool).await?;

        Ok(Fine::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn set_fine_paid(&self, ctx: &Context<'_>, id: i64, paid: bool) -> Result<Fine> {
        let pool = pool_from_ctx(ctx);
        Fine::set_paid(id, paid, pool).await?;

        Ok(Fine::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn delete_fine(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        Fine::delete(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "Staff")]
    pub async fn assign_make_up_job(
        &self,
        ctx: &Context<'_>,
        make_up_job: MakeUpJobForm,
    ) -> Result<MakeUpJob> {
        let pool = pool_from_ctx(ctx);
        let id = MakeUpJob::assign(&make_up_job, pool).await?;

        Ok(MakeUpJob::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn set_make_up_job_completed(
        &self,
        ctx: &Context<'_>,
        id: i64,
        completed: bool,
    ) -> Result<MakeUpJob> {
        let pool = pool_from_ctx(ctx);
        MakeUpJob::set_completed(id, completed, pool).await?;

        Ok(MakeUpJob::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn delete_make_up_job(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        MakeUpJob::delete(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
