use async_graphql::{Context, Object, Result};

use crate::db::pool_from_ctx;
use crate::graphql::guards::{LoggedIn, Staff};
use crate::graphql::SUCCESS_MESSAGE;
use crate::models::position::{Position, PositionForm, PositionHeld, PositionHeldForm};

#[derive(Default)]
pub struct PositionQuery;

#[Object]
impl PositionQuery {
    #[graphql(guard = "LoggedIn")]
    pub async fn position(&self, ctx: &Context<'_>, id: i64) -> Result<Position> {
        let pool = pool_from_ctx(ctx);
        Ok(Position::with_id(id, pool).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn positions(&self, ctx: &Context<'_>) -> Result<Vec<Position>> {
        let pool = pool_from_ctx(ctx);
        Ok(Position::all(pool).await?)
    }

    /// Everyone who has held the position
    #[graphql(guard = "LoggedIn")]
    pub async fn position_holders(
        &self,
        ctx: &Context<'_>,
        position: i64,
    ) -> Result<Vec<PositionHeld>> {
        let pool = pool_from_ctx(ctx);
        Ok(PositionHeld::for_position(position, pool).await?)
    }
}

#[derive(Default)]
pub struct PositionMutation;

#[Object]
impl PositionMutation {
    #[graphql(guard = "Staff")]
    pub async fn create_position(&self, ctx: &Context<'_>, position: PositionForm) -> Result<Position> {
        let pool = pool_from_ctx(ctx);
        let id = Position::create(&position, pool).await?;

        Ok(Position::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn update_position(
        &self,
        ctx: &Context<'_>,
        id: i64,
        position: PositionForm,
    ) -> Result<Position> {
        let pool = pool_from_ctx(ctx);
        Position::update(id, &position, pool).await?;

        Ok(Position::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn delete_position(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        Position::delete(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "Staff")]
    pub async fn assign_position(
        &self,
        ctx: &Context<'_>,
        assignment: PositionHeldForm,
    ) -> Result<PositionHeld> {
        let pool = pool_from_ctx(ctx);
        let id = PositionHeld::assign(&assignment, pool).await?;

        Ok(PositionHeld::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn set_position_active(
        &self,
        ctx: &Context<'_>,
        id: i64,
        is_active: bool,
    ) -> Result<PositionHeld> {
        let pool = pool_from_ctx(ctx);
        PositionHeld::set_active(id, is_active, pool).await?;

        Ok(PositionHeld::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn remove_position_assignment(
        &self,
        ctx: &Context<'_>,
        id: i64,
    ) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        PositionHeld::delete(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
