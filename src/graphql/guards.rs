use async_graphql::{Context, Guard, Result};

use crate::db::pool_from_ctx;
use crate::error::LodgeError;
use crate::models::member::Member;
use crate::models::user::User;

/// Requires an active user forwarded by the host.
pub struct LoggedIn;

impl Guard for LoggedIn {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        match ctx.data_opt::<User>() {
            Some(user) if user.is_active => Ok(()),
            Some(_) => Err(LodgeError::Forbidden(Some("an active account".to_owned())).into()),
            None => Err(LodgeError::Unauthorized.into()),
        }
    }
}

/// Requires an active staff user, the only kind allowed in the admin.
pub struct Staff;

impl Guard for Staff {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        match ctx.data_opt::<User>() {
            Some(user) if user.is_active && user.is_staff => Ok(()),
            Some(_) => Err(LodgeError::Forbidden(Some("staff".to_owned())).into()),
            None => Err(LodgeError::Unauthorized.into()),
        }
    }
}

/// The lodge member the current user is.
pub async fn current_member(ctx: &Context<'_>) -> Result<Member> {
    let user = ctx
        .data_opt::<User>()
        .ok_or(LodgeError::Unauthorized)?;
    let pool = pool_from_ctx(ctx);

    Member::for_user(user.id, pool)
        .await?
        .ok_or_else(|| LodgeError::Forbidden(Some("lodge membership".to_owned())).into())
}
