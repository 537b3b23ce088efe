use async_graphql::{Enum, InputObject, SimpleObject};
use sqlx::SqlitePool;
use time::Date;

use crate::error::{LodgeError, LodgeResult};
use crate::models::GqlDate;

/// An academic term, used to bound position tenures
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
pub struct Term {
    pub id: i64,
    pub begin_date: GqlDate,
    pub end_date: GqlDate,
    pub school_term: SchoolTerm,
}

#[derive(Enum, sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchoolTerm {
    #[sqlx(rename = "F")]
    Fall,
    #[sqlx(rename = "W")]
    Winter,
    #[sqlx(rename = "R")]
    Spring,
    #[sqlx(rename = "S")]
    Summer,
}

const SELECT_TERM: &str = "SELECT id, begin_date, end_date, school_term FROM term";

impl Term {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("term", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_TERM))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!("{} ORDER BY begin_date", SELECT_TERM))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// The term containing `on`, if any. When terms overlap, the one that
    /// started last wins.
    pub async fn current(on: Date, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!(
            "{} WHERE begin_date <= ? AND end_date >= ? ORDER BY begin_date DESC LIMIT 1",
            SELECT_TERM
        ))
        .bind(GqlDate(on))
        .bind(GqlDate(on))
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(form: &TermForm, pool: &SqlitePool) -> LodgeResult<i64> {
        form.validate()?;

        let result =
            sqlx::query("INSERT INTO term (begin_date, end_date, school_term) VALUES (?, ?, ?)")
                .bind(form.begin_date)
                .bind(form.end_date)
                .bind(form.school_term)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(id: i64, form: &TermForm, pool: &SqlitePool) -> LodgeResult<()> {
        form.validate()?;
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE term SET begin_date = ?, end_date = ?, school_term = ? WHERE id = ?")
            .bind(form.begin_date)
            .bind(form.end_date)
            .bind(form.school_term)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM term WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|err| match LodgeError::from(err) {
                LodgeError::Conflict(_) => LodgeError::Conflict(format!(
                    "Term {} bounds position assignments and cannot be deleted",
                    id
                )),
                other => other,
            })?;

        Ok(())
    }

    pub fn contains(&self, on: Date) -> bool {
        self.begin_date.0 <= on && on <= self.end_date.0
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct TermForm {
    pub begin_date: GqlDate,
    pub end_date: GqlDate,
    pub school_term: SchoolTerm,
}

impl TermForm {
    pub fn validate(&self) -> LodgeResult<()> {
        if self.begin_date > self.end_date {
            Err(LodgeError::Invalid(
                "A term cannot begin after it ends".to_owned(),
            ))
        } else {
            Ok(())
        }
    }
}
