use async_graphql::{Context, EmptySubscription, MergedObject, Schema};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::models::GqlDateTime;
use crate::util::now;

pub mod fines;
pub mod guards;
pub mod positions;
pub mod schedule;
pub mod terms;
pub mod trades;
pub mod users;
pub mod work_jobs;

pub const SUCCESS_MESSAGE: &str = "success";

/// Everything the admin can look at, one object per registered model.
#[derive(MergedObject, Default)]
pub struct QueryRoot(
    users::UserQuery,
    work_jobs::WorkJobQuery,
    positions::PositionQuery,
    terms::TermQuery,
    schedule::ScheduleQuery,
    trades::TradeQuery,
    fines::FineQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    users::UserMutation,
    work_jobs::WorkJobMutation,
    positions::PositionMutation,
    terms::TermMutation,
    schedule::ScheduleMutation,
    trades::TradeMutation,
    fines::FineMutation,
);

pub type LodgeSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(pool: SqlitePool, config: Config) -> LodgeSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(pool)
        .data(config)
        .finish()
}

pub fn now_from_ctx(ctx: &Context<'_>) -> GqlDateTime {
    let config = ctx.data_unchecked::<Config>();
    GqlDateTime(now(config.utc_offset))
}
