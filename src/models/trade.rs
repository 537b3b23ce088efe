use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::pool_from_ctx;
use crate::error::{LodgeError, LodgeResult};
use crate::models::member::Member;
use crate::models::schedule::ScheduledWorkJob;
use crate::models::GqlDateTime;

/// A proposal to swap two scheduled work jobs between members.
///
/// Both members have to agree, as well as the work manager (or assistant),
/// before a trade is approved. A permanent trade also swaps all later
/// occurrences of the two underlying work jobs.
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct Trade {
    pub id: i64,
    /// When the trade was proposed
    pub proposed_date: GqlDateTime,
    /// When the trade was approved, if it has been
    pub approved_date: Option<GqlDateTime>,
    pub is_permanent_trade: bool,

    #[graphql(skip)]
    pub proposed_by: i64,
    #[graphql(skip)]
    pub proposed_by_workjob: i64,
    #[graphql(skip)]
    pub recipient: Option<i64>,
    #[graphql(skip)]
    pub recipient_workjob: Option<i64>,
}

#[ComplexObject]
impl Trade {
    /// Whether the trade has been approved
    pub async fn is_resolved(&self) -> bool {
        self.resolved()
    }

    pub async fn proposed_by(&self, ctx: &Context<'_>) -> Result<Member> {
        let pool = pool_from_ctx(ctx);
        Ok(Member::with_id(self.proposed_by, pool).await?)
    }

    /// The job the proposer wants to give away
    pub async fn proposed_by_workjob(&self, ctx: &Context<'_>) -> Result<ScheduledWorkJob> {
        let pool = pool_from_ctx(ctx);
        Ok(ScheduledWorkJob::with_id(self.proposed_by_workjob, pool).await?)
    }

    /// The member taking the job, unless the offer is still open
    pub async fn recipient(&self, ctx: &Context<'_>) -> Result<Option<Member>> {
        let pool = pool_from_ctx(ctx);
        match self.recipient {
            Some(recipient) => Ok(Some(Member::with_id(recipient, pool).await?)),
            None => Ok(None),
        }
    }

    /// The job the proposer takes in exchange
    pub async fn recipient_workjob(&self, ctx: &Context<'_>) -> Result<Option<ScheduledWorkJob>> {
        let pool = pool_from_ctx(ctx);
        match self.recipient_workjob {
            Some(workjob) => Ok(Some(ScheduledWorkJob::with_id(workjob, pool).await?)),
            None => Ok(None),
        }
    }
}

const SELECT_TRADE: &str = "SELECT id, proposed_date, proposed_by, proposed_by_workjob, recipient, \
                            recipient_workjob, approved_date, is_permanent_trade FROM trade";

impl Trade {
    pub fn resolved(&self) -> bool {
        self.approved_date.is_some()
    }

    pub async fn with_id(id: i64, pool: &SqlitePool) -> LodgeResult<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| LodgeError::not_found("trade", id))
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> LodgeResult<Option<Self>> {
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_TRADE))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pending_only: bool, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        let filter = if pending_only {
            "WHERE approved_date IS NULL"
        } else {
            ""
        };

        sqlx::query_as(&format!("{} {} ORDER BY proposed_date, id", SELECT_TRADE, filter))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn for_member(member: i64, pool: &SqlitePool) -> LodgeResult<Vec<Self>> {
        sqlx::query_as(&format!(
            "{} WHERE proposed_by = ? OR recipient = ? ORDER BY proposed_date, id",
            SELECT_TRADE
        ))
        .bind(member)
        .bind(member)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Offers one of the proposer's jobs up for trade. Without a recipient
    /// the offer stays open for anyone to accept.
    pub async fn propose(
        proposal: &TradeProposal,
        proposed_date: GqlDateTime,
        pool: &SqlitePool,
    ) -> LodgeResult<i64> {
        let offered = ScheduledWorkJob::with_id(proposal.proposed_by_workjob, pool).await?;
        if offered.member != proposal.proposed_by {
            return Err(LodgeError::Invalid(format!(
                "Member {} cannot trade away scheduled work job {}, which is not theirs",
                proposal.proposed_by, offered.id
            )));
        }

        if let Some(recipient) = proposal.recipient {
            Member::with_id(recipient, pool).await?;
            if recipient == proposal.proposed_by {
                return Err(LodgeError::Invalid(
                    "A member cannot trade with themself".to_owned(),
                ));
            }
        }
        if let Some(wanted_id) = proposal.recipient_workjob {
            let wanted = ScheduledWorkJob::with_id(wanted_id, pool).await?;
            if wanted.id == offered.id {
                return Err(LodgeError::Invalid(
                    "A work job cannot be traded for itself".to_owned(),
                ));
            }
            if wanted.member == proposal.proposed_by {
                return Err(LodgeError::Invalid(
                    "A member cannot trade with themself".to_owned(),
                ));
            }
            if let Some(recipient) = proposal.recipient {
                if wanted.member != recipient {
                    return Err(LodgeError::Invalid(format!(
                        "Scheduled work job {} does not belong to member {}",
                        wanted.id, recipient
                    )));
                }
            }
        }

        let result = sqlx::query(
            "INSERT INTO trade (proposed_date, proposed_by, proposed_by_workjob, recipient,
                 recipient_workjob, is_permanent_trade)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(proposed_date)
        .bind(proposal.proposed_by)
        .bind(proposal.proposed_by_workjob)
        .bind(proposal.recipient)
        .bind(proposal.recipient_workjob)
        .bind(proposal.is_permanent_trade)
        .execute(pool)
        .await?;
        let id = result.last_insert_rowid();
        tracing::info!(trade = id, proposed_by = proposal.proposed_by, "proposed trade");

        Ok(id)
    }

    /// Claims an open trade on behalf of `member`, who offers `workjob` in
    /// exchange.
    pub async fn accept(id: i64, member: i64, workjob: i64, pool: &SqlitePool) -> LodgeResult<()> {
        let trade = Self::with_id(id, pool).await?;
        trade.ensure_pending()?;

        if member == trade.proposed_by {
            return Err(LodgeError::Invalid(
                "A member cannot accept their own trade".to_owned(),
            ));
        }
        if trade.recipient_workjob.is_some() {
            return Err(LodgeError::Invalid(format!(
                "Trade {} already names the work job offered in exchange",
                id
            )));
        }
        if let Some(recipient) = trade.recipient {
            if recipient != member {
                return Err(LodgeError::Invalid(format!(
                    "Trade {} was offered to another member",
                    id
                )));
            }
        }

        let offered = ScheduledWorkJob::with_id(workjob, pool).await?;
        if offered.member != member {
            return Err(LodgeError::Invalid(format!(
                "Scheduled work job {} does not belong to member {}",
                workjob, member
            )));
        }
        if offered.id == trade.proposed_by_workjob {
            return Err(LodgeError::Invalid(
                "A work job cannot be traded for itself".to_owned(),
            ));
        }

        sqlx::query("UPDATE trade SET recipient = ?, recipient_workjob = ? WHERE id = ?")
            .bind(member)
            .bind(workjob)
            .bind(id)
            .execute(pool)
            .await?;
        tracing::info!(trade = id, recipient = member, "accepted trade");

        Ok(())
    }

    /// Approves the trade and swaps the members of the traded jobs. Nothing
    /// on the schedule changes until this runs.
    pub async fn approve(id: i64, approved_date: GqlDateTime, pool: &SqlitePool) -> LodgeResult<()> {
        let mut transaction = pool.begin().await?;

        let trade: Self = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_TRADE))
            .bind(id)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or_else(|| LodgeError::not_found("trade", id))?;
        trade.ensure_pending()?;

        let recipient_workjob_id = trade.recipient_workjob.ok_or_else(|| {
            LodgeError::Invalid(format!(
                "Trade {} cannot be approved until a work job is offered in exchange",
                id
            ))
        })?;
        let given = ScheduledWorkJob::with_id_in(trade.proposed_by_workjob, &mut transaction).await?;
        let taken = ScheduledWorkJob::with_id_in(recipient_workjob_id, &mut transaction).await?;
        let recipient = trade.recipient.unwrap_or(taken.member);

        if recipient == trade.proposed_by {
            return Err(LodgeError::Invalid(
                "A member cannot trade with themself".to_owned(),
            ));
        }
        if given.member != trade.proposed_by {
            return Err(LodgeError::Conflict(format!(
                "Scheduled work job {} no longer belongs to the proposer",
                given.id
            )));
        }
        if taken.member != recipient {
            return Err(LodgeError::Conflict(format!(
                "Scheduled work job {} no longer belongs to the recipient",
                taken.id
            )));
        }

        let result = sqlx::query(
            "UPDATE trade SET approved_date = ?, recipient = ? WHERE id = ? AND approved_date IS NULL",
        )
        .bind(approved_date)
        .bind(recipient)
        .bind(id)
        .execute(&mut *transaction)
        .await?;
        if result.rows_affected() != 1 {
            return Err(LodgeError::Invalid(format!(
                "Trade {} has already been approved",
                id
            )));
        }

        if trade.is_permanent_trade {
            Self::swap_going_forward(&given, &taken, trade.proposed_by, recipient, &mut transaction)
                .await?;
        } else {
            Self::swap_one(&given, &taken, trade.proposed_by, recipient, &mut transaction).await?;
        }

        transaction.commit().await?;
        tracing::info!(
            trade = id,
            proposed_by = trade.proposed_by,
            recipient,
            permanent = trade.is_permanent_trade,
            "approved trade"
        );

        Ok(())
    }

    async fn swap_one(
        given: &ScheduledWorkJob,
        taken: &ScheduledWorkJob,
        proposed_by: i64,
        recipient: i64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> LodgeResult<()> {
        sqlx::query("UPDATE scheduled_work_job SET member = ? WHERE id = ?")
            .bind(recipient)
            .bind(given.id)
            .execute(&mut **transaction)
            .await?;
        sqlx::query("UPDATE scheduled_work_job SET member = ? WHERE id = ?")
            .bind(proposed_by)
            .bind(taken.id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }

    /// Swaps every occurrence of the two jobs from the traded dates on.
    async fn swap_going_forward(
        given: &ScheduledWorkJob,
        taken: &ScheduledWorkJob,
        proposed_by: i64,
        recipient: i64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> LodgeResult<()> {
        let given_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM scheduled_work_job WHERE work_job = ? AND member = ? AND date_due >= ?",
        )
        .bind(given.work_job)
        .bind(proposed_by)
        .bind(given.date_due)
        .fetch_all(&mut **transaction)
        .await?;
        let taken_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM scheduled_work_job WHERE work_job = ? AND member = ? AND date_due >= ?",
        )
        .bind(taken.work_job)
        .bind(recipient)
        .bind(taken.date_due)
        .fetch_all(&mut **transaction)
        .await?;

        for given_id in given_ids {
            sqlx::query("UPDATE scheduled_work_job SET member = ? WHERE id = ?")
                .bind(recipient)
                .bind(given_id)
                .execute(&mut **transaction)
                .await?;
        }
        for taken_id in taken_ids {
            sqlx::query("UPDATE scheduled_work_job SET member = ? WHERE id = ?")
                .bind(proposed_by)
                .bind(taken_id)
                .execute(&mut **transaction)
                .await?;
        }

        Ok(())
    }

    /// Takes back a trade that has not been approved yet.
    pub async fn withdraw(id: i64, pool: &SqlitePool) -> LodgeResult<()> {
        let trade = Self::with_id(id, pool).await?;
        trade.ensure_pending()?;

        sqlx::query("DELETE FROM trade WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    fn ensure_pending(&self) -> LodgeResult<()> {
        if self.resolved() {
            Err(LodgeError::Invalid(format!(
                "Trade {} has already been approved",
                self.id
            )))
        } else {
            Ok(())
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct TradeProposal {
    pub proposed_by: i64,
    pub proposed_by_workjob: i64,
    pub recipient: Option<i64>,
    pub recipient_workjob: Option<i64>,
    #[graphql(default)]
    pub is_permanent_trade: bool,
}
