use async_graphql::{Context, Object, Result};

use crate::config::Config;
use crate::db::pool_from_ctx;
use crate::graphql::guards::{LoggedIn, Staff};
use crate::graphql::SUCCESS_MESSAGE;
use crate::models::term::{Term, TermForm};
use crate::util::today;

#[derive(Default)]
pub struct TermQuery;

#[Object]
impl TermQuery {
    #[graphql(guard = "LoggedIn")]
    pub async fn term(&self, ctx: &Context<'_>, id: i64) -> Result<Term> {
        let pool = pool_from_ctx(ctx);
        Ok(Term::with_id(id, pool).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn terms(&self, ctx: &Context<'_>) -> Result<Vec<Term>> {
        let pool = pool_from_ctx(ctx);
        Ok(Term::all(pool).await?)
    }

    /// The term in progress today, if any
    #[graphql(guard = "LoggedIn")]
    pub async fn current_term(&self, ctx: &Context<'_>) -> Result<Option<Term>> {
        let pool = pool_from_ctx(ctx);
        let config = ctx.data_unchecked::<Config>();
        Ok(Term::current(today(config.utc_offset), pool).await?)
    }
}

#[derive(Default)]
pub struct TermMutation;

#[Object]
impl TermMutation {
    #[graphql(guard = "Staff")]
    pub async fn create_term(&self, ctx: &Context<'_>, term: TermForm) -> Result<Term> {
        let pool = pool_from_ctx(ctx);
        let id = Term::create(&term, pool).await?;

        Ok(Term::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn update_term(&self, ctx: &Context<'_>, id: i64, term: TermForm) -> Result<Term> {
        let pool = pool_from_ctx(ctx);
        Term::update(id, &term, pool).await?;

        Ok(Term::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn delete_term(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        Term::delete(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
