use async_graphql::{Context, Object, Result};

use crate::db::pool_from_ctx;
use crate::graphql::guards::{LoggedIn, Staff};
use crate::graphql::{now_from_ctx, SUCCESS_MESSAGE};
use crate::models::member::{Member, MemberForm};
use crate::models::user::{User, UserForm};

/// Users, with their lodge membership edited inline.
#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The user the host forwarded, if any
    pub async fn me(&self, ctx: &Context<'_>) -> Option<User> {
        ctx.data_opt::<User>().cloned()
    }

    #[graphql(guard = "Staff")]
    pub async fn user(&self, ctx: &Context<'_>, id: i64) -> Result<User> {
        let pool = pool_from_ctx(ctx);
        Ok(User::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let pool = pool_from_ctx(ctx);
        Ok(User::all(pool).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn member(&self, ctx: &Context<'_>, id: i64) -> Result<Member> {
        let pool = pool_from_ctx(ctx);
        Ok(Member::with_id(id, pool).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn members(&self, ctx: &Context<'_>) -> Result<Vec<Member>> {
        let pool = pool_from_ctx(ctx);
        Ok(Member::all(pool).await?)
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Creates a user, and their membership if one is given
    #[graphql(guard = "Staff")]
    pub async fn create_user(
        &self,
        ctx: &Context<'_>,
        user: UserForm,
        member: Option<MemberForm>,
    ) -> Result<User> {
        let pool = pool_from_ctx(ctx);
        let id = User::create(&user, member.as_ref(), now_from_ctx(ctx), pool).await?;

        Ok(User::with_id(id, pool).await?)
    }

    /// Updates a user. A given membership is created or updated alongside;
    /// leaving it out keeps the current one.
    #[graphql(guard = "Staff")]
    pub async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: i64,
        user: UserForm,
        member: Option<MemberForm>,
    ) -> Result<User> {
        let pool = pool_from_ctx(ctx);
        User::update(id, &user, member.as_ref(), pool).await?;

        Ok(User::with_id(id, pool).await?)
    }

    #[graphql(guard = "Staff")]
    pub async fn delete_user(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        let pool = pool_from_ctx(ctx);
        User::delete(id, pool).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
