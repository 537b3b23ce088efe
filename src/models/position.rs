use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;

use crate::db::pool_from_ctx;
use crate::error::{LodgeError, LodgeResult};
use crate::models::member::Member;
use crate::models::term::Term;
use crate::util::check_length;

/// An exec or house position. Holders may get a reduced work job load.
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
pub struct Position {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub seniority_points: i32,
    /// Whether this is an exec position
    pub is_exec: bool,
    /// How much of the usual work job load holders are excused from, from 0 to 100
    pub percent_off_workjobs: i32,
}

const SELECT_POSITION: &str = "SELECT id, title, description, seniority_points, is_exec, \
                               percent_off_workjobs FROM position";

impl Position {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("position", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_POSITION))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!(
            "{} ORDER BY is_exec DESC, seniority_points DESC, title",
            SELECT_POSITION
        ))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(form: &PositionForm, pool: &SqlitePool) -> LodgeResult<i64> {
        form.validate()?;

        let result = sqlx::query(
            "INSERT INTO position (title, description, seniority_points, is_exec, percent_off_workjobs)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.seniority_points)
        .bind(form.is_exec)
        .bind(form.percent_off_workjobs)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(id: i64, form: &PositionForm, pool: &SqlitePool) -> LodgeResult<()> {
        form.validate()?;
        Self::with_id(id, pool).await?;

        sqlx::query(
            "UPDATE position SET title = ?, description = ?, seniority_points = ?,
                 is_exec = ?, percent_off_workjobs = ?
             WHERE id = ?",
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.seniority_points)
        .bind(form.is_exec)
        .bind(form.percent_off_workjobs)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM position WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|err| match LodgeError::from(err) {
                LodgeError::Conflict(_) => LodgeError::Conflict(format!(
                    "Position {} has been held by members and cannot be deleted",
                    id
                )),
                other => other,
            })?;

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct PositionForm {
    pub title: String,
    pub description: String,
    #[graphql(default)]
    pub seniority_points: i32,
    #[graphql(default)]
    pub is_exec: bool,
    #[graphql(default)]
    pub percent_off_workjobs: i32,
}

impl PositionForm {
    fn validate(&self) -> LodgeResult<()> {
        check_length("title", &self.title, 20)?;
        check_length("description", &self.description, 200)?;
        if !(0..=100).contains(&self.percent_off_workjobs) {
            return Err(LodgeError::Invalid(format!(
                "Percent off work jobs must be between 0 and 100, not {}",
                self.percent_off_workjobs
            )));
        }

        Ok(())
    }
}

/// A member's tenure in a position, bounded by terms
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct PositionHeld {
    pub id: i64,
    pub is_active: bool,

    #[graphql(skip)]
    pub position: i64,
    #[graphql(skip)]
    pub member: i64,
    #[graphql(skip)]
    pub begin_term: i64,
    #[graphql(skip)]
    pub end_term: i64,
}

#[ComplexObject]
impl PositionHeld {
    pub async fn position(&self, ctx: &Context<'_>) -> Result<Position> {
        let pool = pool_from_ctx(ctx);
        Ok(Position::with_id(self.position, pool).await?)
    }

    pub async fn member(&self, ctx: &Context<'_>) -> Result<Member> {
        let pool = pool_from_ctx(ctx);
        Ok(Member::with_id(self.member, pool).await?)
    }

    /// The term the tenure starts in
    pub async fn begin_term(&self, ctx: &Context<'_>) -> Result<Term> {
        let pool = pool_from_ctx(ctx);
        Ok(Term::with_id(self.begin_term, pool).await?)
    }

    /// The term the tenure ends in
    pub async fn end_term(&self, ctx: &Context<'_>) -> Result<Term> {
        let pool = pool_from_ctx(ctx);
        Ok(Term::with_id(self.end_term, pool).await?)
    }
}

const SELECT_POSITION_HELD: &str =
    "SELECT id, position, member, begin_term, end_term, is_active FROM position_held";

impl PositionHeld {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("position assignment", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_POSITION_HELD))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn for_member(member: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT position_held.id, position_held.position, position_held.member,
                 position_held.begin_term, position_held.end_term, position_held.is_active
             FROM position_held INNER JOIN term ON term.id = position_held.begin_term
             WHERE position_held.member = ? ORDER BY term.begin_date DESC",
        )
        .bind(member)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn for_position(position: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT position_held.id, position_held.position, position_held.member,
                 position_held.begin_term, position_held.end_term, position_held.is_active
             FROM position_held INNER JOIN term ON term.id = position_held.begin_term
             WHERE position_held.position = ? ORDER BY term.begin_date DESC",
        )
        .bind(position)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    async fn active_for(member: i64, position: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!(
            "{} WHERE member = ? AND position = ? AND is_active",
            SELECT_POSITION_HELD
        ))
        .bind(member)
        .bind(position)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Puts a member in a position from one term through another.
    pub async fn assign(form: &PositionHeldForm, pool: &SqlitePool) -> LodgeResult<i64> {
        Member::with_id(form.member, pool).await?;
        Position::with_id(form.position, pool).await?;
        let begin_term = Term::with_id(form.begin_term, pool).await?;
        let end_term = Term::with_id(form.end_term, pool).await?;

        if begin_term.begin_date > end_term.end_date {
            return Err(LodgeError::Invalid(
                "The beginning term must not start after the ending term ends".to_owned(),
            ));
        }
        if form.is_active
            && Self::active_for(form.member, form.position, pool)
                .await?
                .is_some()
        {
            return Err(LodgeError::Invalid(format!(
                "Member {} already actively holds position {}",
                form.member, form.position
            )));
        }

        let result = sqlx::query(
            "INSERT INTO position_held (position, member, begin_term, end_term, is_active)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(form.position)
        .bind(form.member)
        .bind(form.begin_term)
        .bind(form.end_term)
        .bind(form.is_active)
        .execute(pool)
        .await?;
        tracing::info!(member = form.member, position = form.position, "assigned position");

        Ok(result.last_insert_rowid())
    }

    pub async fn set_active(id: i64, is_active: bool, pool: &SqlitePool) -> LodgeResult<()> {
        let held = Self::with_id(id, pool).await?;
        if is_active && !held.is_active {
            if let Some(other) = Self::active_for(held.member, held.position, pool).await? {
                return Err(LodgeError::Invalid(format!(
                    "Member {} already actively holds position {} through assignment {}",
                    held.member, held.position, other.id
                )));
            }
        }

        sqlx::query("UPDATE position_held SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM position_held WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct PositionHeldForm {
    pub position: i64,
    pub member: i64,
    pub begin_term: i64,
    pub end_term: i64,
    #[graphql(default = true)]
    pub is_active: bool,
}
