use async_graphql::{Context, Object, Result};

use crate::db::pool_from_ctx;
use crate::error::LodgeError;
use crate::graphql::guards::{current_member, LoggedIn, Staff};
use crate::graphql::{now_from_ctx, SUCCESS_MESSAGE};
use crate::models::trade::{Trade, TradeProposal};
use crate::models::user::User;

/// Staff can act on behalf of any member, everyone else only for themself.
async fn check_acting_as(ctx: &Context<'_>, member: i64) -> Result<()> {
    if ctx.data_opt::<User>().map(|user| user.is_staff) == Some(true) {
        return Ok(());
    }

    let current = current_member(ctx).await?;
    if current.id == member {
        Ok(())
    } else {
        Err(LodgeError::Forbidden(Some("the work job's own member or staff".to_owned())).into())
    }
}

#[derive(Default)]
pub struct TradeQuery;

#[Object]
impl TradeQuery {
    #[graphql(guard = "LoggedIn")]
    pub async fn trade(&self, ctx: &Context<'_>, id: i64) -> Result<Trade> {
        let pool = pool_from_ctx(ctx);
        Ok(Trade::with_id(id, pool).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn trades(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] pending_only: bool,
    ) -> Result<Vec<Trade>> {
        let pool = pool_from_ctx(ctx);
        Ok(Trade::all(pending_only, pool).await?)
    }

    /// Trades the current user proposed or received
    #[graphql(guard = "LoggedIn")]
    pub async fn my_trades(&self, ctx: &Context<'_>) -> Result<Vec<Trade>> {
        let pool = pool_from_ctx(ctx);
        let member = current_member(ctx).await?;
        Ok(Trade::for_member(member.id, pool).await?)
    }
}

#[derive(Default)]
pub struct TradeMutation;

#[Object]
impl TradeMutation {
    #[graphql(guard = "LoggedIn")]
    pub async fn propose_trade(&self, ctx: &Context<'_>, proposal: TradeProposal) -> Result<Trade> {
        check_acting_as(ctx, proposal.proposed_by).await?;
        let pool = pool_from_ctx(ctx);
        let id = Trade::propose(&proposal, now_from_ctx(ctx), pool).await?;

        Ok(Trade::with_id(id, pool).await?)
    }

    /// Takes up a trade, offering one of the current user's jobs in return
    #[graphql(guard = "LoggedIn")]
    pub async fn accept_trade(&self, ctx: &Context<'_>, id: i64, workjob: i64) -> Result<Trade> {
        let pool = pool_from_ctx(ctx);
        let member = current_member(ctx).await?;
        Trade::accept(id, member.id, workjob, pool).await?;

        Ok(Trade::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn approve_trade(&self, ctx: &Context<'_>, id: i64) -> Result<Trade> {
        let pool = pool_from_ctx(ctx);
        Trade::approve(id, now_from_ctx(ctx), pool).await?;

        Ok(Trade::with_id(id, pool).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn withdraw_trade(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        let trade = Trade::with_id(id, pool).await?;
        check_acting_as(ctx, trade.proposed_by).await?;
        Trade::withdraw(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
