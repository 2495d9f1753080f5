//! PostgreSQL ledger repository.
//!
//! Balance-affecting operations run in one database transaction and take
//! `SELECT ... FOR UPDATE` locks on the request row before the wallet row, so
//! concurrent decisions on the same wallet queue up instead of racing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use models::{payout, subscription, subscription_plan, transaction, user, wallet};

use crate::ledger::domain::{
    self, Decision, ExpiryOutcome, ExpiryPlan, NewSubscription, Payout, PayoutFilter, PlanTerms, RequestStatus,
    Subscription, SubscriptionStatus, Transaction, TransactionFilter, TransactionKind, Wallet,
};
use crate::ledger::errors::LedgerError;
use crate::ledger::repository::LedgerRepository;

pub struct SeaOrmLedgerRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmLedgerRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn begin(&self) -> Result<DatabaseTransaction, LedgerError> {
        self.db.begin().await.map_err(repo_err)
    }
}

fn repo_err(e: DbErr) -> LedgerError {
    LedgerError::from(models::errors::ModelError::from(e))
}

fn utc(ts: sea_orm::prelude::DateTimeWithTimeZone) -> DateTime<Utc> {
    ts.with_timezone(&Utc)
}

fn to_wallet(m: wallet::Model) -> Wallet {
    Wallet { id: m.id, user_id: m.user_id, balance: m.balance, created_at: utc(m.created_at), updated_at: utc(m.updated_at) }
}

fn to_transaction(m: transaction::Model) -> Result<Transaction, LedgerError> {
    Ok(Transaction {
        id: m.id,
        wallet_id: m.wallet_id,
        kind: m.kind.parse()?,
        amount: m.amount,
        status: m.status.parse()?,
        reference: m.reference,
        subscription_id: m.subscription_id,
        processed_at: m.processed_at.map(utc),
        created_at: utc(m.created_at),
    })
}

fn to_payout(m: payout::Model) -> Result<Payout, LedgerError> {
    Ok(Payout {
        id: m.id,
        wallet_id: m.wallet_id,
        amount: m.amount,
        status: m.status.parse()?,
        destination: m.destination,
        processed_at: m.processed_at.map(utc),
        created_at: utc(m.created_at),
    })
}

fn to_plan(m: subscription_plan::Model) -> PlanTerms {
    PlanTerms {
        id: m.id,
        duration_days: m.duration_days,
        min_investment: m.min_investment,
        max_investment: m.max_investment,
        is_active: m.is_active,
    }
}

fn to_subscription(m: subscription::Model) -> Result<Subscription, LedgerError> {
    Ok(Subscription {
        id: m.id,
        wallet_id: m.wallet_id,
        plan_id: m.plan_id,
        amount: m.amount,
        earnings: m.earnings,
        reinvest: m.reinvest,
        status: m.status.parse()?,
        start_date: utc(m.start_date),
        end_date: utc(m.end_date),
        renewed_from: m.renewed_from,
    })
}

async fn lock_wallet<C: ConnectionTrait>(conn: &C, id: i64) -> Result<wallet::Model, LedgerError> {
    wallet::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(repo_err)?
        .ok_or(LedgerError::WalletNotFound)
}

async fn write_balance<C: ConnectionTrait>(conn: &C, w: wallet::Model, balance: Decimal) -> Result<wallet::Model, LedgerError> {
    if w.balance == balance {
        return Ok(w);
    }
    let mut am: wallet::ActiveModel = w.into();
    am.balance = Set(balance);
    am.updated_at = Set(Utc::now().into());
    am.update(conn).await.map_err(repo_err)
}

async fn insert_subscription_row<C: ConnectionTrait>(conn: &C, new: NewSubscription) -> Result<subscription::Model, LedgerError> {
    let now = Utc::now();
    subscription::ActiveModel {
        wallet_id: Set(new.wallet_id),
        plan_id: Set(new.plan_id),
        amount: Set(new.amount),
        earnings: Set(Decimal::ZERO),
        reinvest: Set(new.reinvest),
        status: Set(SubscriptionStatus::Active.as_str().to_string()),
        start_date: Set(new.start_date.into()),
        end_date: Set(new.end_date.into()),
        renewed_from: Set(new.renewed_from),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(repo_err)
}

#[async_trait::async_trait]
impl LedgerRepository for SeaOrmLedgerRepository {
    async fn user_exists(&self, user_id: i64) -> Result<bool, LedgerError> {
        let n = user::Entity::find_by_id(user_id).count(&self.db).await.map_err(repo_err)?;
        Ok(n > 0)
    }

    async fn create_wallet(&self, user_id: i64) -> Result<Wallet, LedgerError> {
        let created = wallet::create(&self.db, user_id).await.map_err(|e| match e {
            models::errors::ModelError::Conflict(_) => LedgerError::Conflict("wallet already exists for user".into()),
            other => other.into(),
        })?;
        Ok(to_wallet(created))
    }

    async fn find_wallet(&self, id: i64) -> Result<Option<Wallet>, LedgerError> {
        let found = wallet::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        Ok(found.map(to_wallet))
    }

    async fn find_wallet_by_user(&self, user_id: i64) -> Result<Option<Wallet>, LedgerError> {
        let found = wallet::Entity::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(found.map(to_wallet))
    }

    async fn insert_pending_transaction(
        &self,
        wallet_id: i64,
        kind: TransactionKind,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        let row = transaction::new_row(wallet_id, kind.as_str(), amount, RequestStatus::Pending.as_str(), reference, None)
            .insert(&self.db)
            .await
            .map_err(repo_err)?;
        to_transaction(row)
    }

    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>, LedgerError> {
        let found = transaction::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        found.map(to_transaction).transpose()
    }

    async fn list_transactions(&self, filter: &TransactionFilter, offset: u64, limit: u64) -> Result<Vec<Transaction>, LedgerError> {
        let mut q = transaction::Entity::find();
        if let Some(w) = filter.wallet_id {
            q = q.filter(transaction::Column::WalletId.eq(w));
        }
        if let Some(k) = filter.kind {
            q = q.filter(transaction::Column::Kind.eq(k.as_str()));
        }
        if let Some(s) = filter.status {
            q = q.filter(transaction::Column::Status.eq(s.as_str()));
        }
        let rows = q
            .order_by_desc(transaction::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        rows.into_iter().map(to_transaction).collect()
    }

    async fn settle_transaction(&self, id: i64, kind: TransactionKind, decision: Decision) -> Result<(Transaction, Wallet), LedgerError> {
        let effect = kind.effect().ok_or(LedgerError::NotFoundOrProcessed(kind.as_str()))?;
        let txn = self.begin().await?;

        let row = transaction::Entity::find_by_id(id)
            .filter(transaction::Column::Kind.eq(kind.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(repo_err)?
            .ok_or(LedgerError::NotFoundOrProcessed(kind.as_str()))?;
        domain::ensure_pending(row.status.parse()?, kind.as_str())?;

        let w = lock_wallet(&txn, row.wallet_id).await?;
        let balance = domain::settle(effect, w.balance, row.amount, decision)?;
        let w = write_balance(&txn, w, balance).await?;

        let mut am: transaction::ActiveModel = row.into();
        let now = Utc::now();
        am.status = Set(decision.status().as_str().to_string());
        am.processed_at = Set(Some(now.into()));
        am.updated_at = Set(now.into());
        let row = am.update(&txn).await.map_err(repo_err)?;

        txn.commit().await.map_err(repo_err)?;
        Ok((to_transaction(row)?, to_wallet(w)))
    }

    async fn insert_pending_payout(&self, wallet_id: i64, amount: Decimal, destination: Option<String>) -> Result<Payout, LedgerError> {
        let row = payout::new_pending(wallet_id, amount, destination).insert(&self.db).await.map_err(repo_err)?;
        to_payout(row)
    }

    async fn find_payout(&self, id: i64) -> Result<Option<Payout>, LedgerError> {
        let found = payout::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        found.map(to_payout).transpose()
    }

    async fn list_payouts(&self, filter: &PayoutFilter, offset: u64, limit: u64) -> Result<Vec<Payout>, LedgerError> {
        let mut q = payout::Entity::find();
        if let Some(w) = filter.wallet_id {
            q = q.filter(payout::Column::WalletId.eq(w));
        }
        if let Some(s) = filter.status {
            q = q.filter(payout::Column::Status.eq(s.as_str()));
        }
        let rows = q
            .order_by_desc(payout::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        rows.into_iter().map(to_payout).collect()
    }

    async fn settle_payout(&self, id: i64, decision: Decision) -> Result<(Payout, Wallet), LedgerError> {
        let txn = self.begin().await?;

        let row = payout::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(repo_err)?
            .ok_or(LedgerError::NotFoundOrProcessed("payout"))?;
        domain::ensure_pending(row.status.parse()?, "payout")?;

        let w = lock_wallet(&txn, row.wallet_id).await?;
        let balance = domain::settle(domain::BalanceEffect::Debit, w.balance, row.amount, decision)?;
        let w = write_balance(&txn, w, balance).await?;

        let mut am: payout::ActiveModel = row.into();
        let now = Utc::now();
        am.status = Set(decision.status().as_str().to_string());
        am.processed_at = Set(Some(now.into()));
        am.updated_at = Set(now.into());
        let row = am.update(&txn).await.map_err(repo_err)?;

        txn.commit().await.map_err(repo_err)?;
        Ok((to_payout(row)?, to_wallet(w)))
    }

    async fn find_plan(&self, id: i64) -> Result<Option<PlanTerms>, LedgerError> {
        let found = subscription_plan::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        Ok(found.map(to_plan))
    }

    async fn insert_subscription(&self, new: NewSubscription) -> Result<Subscription, LedgerError> {
        let row = insert_subscription_row(&self.db, new).await?;
        to_subscription(row)
    }

    async fn find_subscription(&self, id: i64) -> Result<Option<Subscription>, LedgerError> {
        let found = subscription::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        found.map(to_subscription).transpose()
    }

    async fn list_subscriptions(&self, wallet_id: Option<i64>, offset: u64, limit: u64) -> Result<Vec<Subscription>, LedgerError> {
        let mut q = subscription::Entity::find();
        if let Some(w) = wallet_id {
            q = q.filter(subscription::Column::WalletId.eq(w));
        }
        let rows = q
            .order_by_desc(subscription::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        rows.into_iter().map(to_subscription).collect()
    }

    async fn set_reinvest(&self, id: i64, reinvest: bool) -> Result<Subscription, LedgerError> {
        let res = subscription::Entity::update_many()
            .col_expr(subscription::Column::Reinvest, Expr::value(reinvest))
            .col_expr(subscription::Column::UpdatedAt, Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())))
            .filter(subscription::Column::Id.eq(id))
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;
        if res.rows_affected == 0 {
            return Err(LedgerError::NotFoundOrProcessed("subscription"));
        }
        self.find_subscription(id).await?.ok_or(LedgerError::NotFoundOrProcessed("subscription"))
    }

    async fn add_earnings(&self, subscription_id: i64, amount: Decimal) -> Result<(Subscription, Transaction), LedgerError> {
        let txn = self.begin().await?;

        let row = subscription::Entity::find_by_id(subscription_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(repo_err)?
            .ok_or(LedgerError::NotFoundOrProcessed("subscription"))?;
        domain::ensure_active(&to_subscription(row.clone())?)?;

        let wallet_id = row.wallet_id;
        let earnings = row.earnings + amount;
        let mut am: subscription::ActiveModel = row.into();
        am.earnings = Set(earnings);
        am.updated_at = Set(Utc::now().into());
        let row = am.update(&txn).await.map_err(repo_err)?;

        let tx = transaction::new_row(
            wallet_id,
            TransactionKind::Earning.as_str(),
            amount,
            RequestStatus::Accepted.as_str(),
            Some(format!("subscription:{subscription_id}")),
            Some(subscription_id),
        )
        .insert(&txn)
        .await
        .map_err(repo_err)?;

        txn.commit().await.map_err(repo_err)?;
        Ok((to_subscription(row)?, to_transaction(tx)?))
    }

    async fn expire_subscription(&self, id: i64, now: DateTime<Utc>) -> Result<ExpiryOutcome, LedgerError> {
        let txn = self.begin().await?;

        let row = subscription::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(repo_err)?
            .ok_or(LedgerError::NotFoundOrProcessed("subscription"))?;
        let current = to_subscription(row.clone())?;
        let plan = domain::plan_expiry(&current, now)?;

        let next_status = match plan {
            ExpiryPlan::Reinvest { .. } => SubscriptionStatus::Reinvested,
            ExpiryPlan::Complete { .. } => SubscriptionStatus::Completed,
        };
        let mut am: subscription::ActiveModel = row.into();
        am.status = Set(next_status.as_str().to_string());
        am.updated_at = Set(Utc::now().into());
        let expired = to_subscription(am.update(&txn).await.map_err(repo_err)?)?;

        let outcome = match plan {
            ExpiryPlan::Reinvest { amount } => {
                let terms = subscription_plan::Entity::find_by_id(current.plan_id)
                    .one(&txn)
                    .await
                    .map_err(repo_err)?
                    .ok_or(LedgerError::NotFound("plan"))?;
                let renewed = insert_subscription_row(
                    &txn,
                    NewSubscription {
                        wallet_id: current.wallet_id,
                        plan_id: current.plan_id,
                        amount,
                        reinvest: current.reinvest,
                        start_date: now,
                        end_date: domain::end_date(now, terms.duration_days),
                        renewed_from: Some(id),
                    },
                )
                .await?;
                ExpiryOutcome { expired, renewed: Some(to_subscription(renewed)?), credited: None }
            }
            ExpiryPlan::Complete { payout } if payout > Decimal::ZERO => {
                let w = lock_wallet(&txn, current.wallet_id).await?;
                let balance = domain::settle(domain::BalanceEffect::Credit, w.balance, payout, Decision::Accept)?;
                write_balance(&txn, w, balance).await?;
                let tx = transaction::new_row(
                    current.wallet_id,
                    TransactionKind::Deposit.as_str(),
                    payout,
                    RequestStatus::Accepted.as_str(),
                    Some(format!("subscription:{id} earnings")),
                    Some(id),
                )
                .insert(&txn)
                .await
                .map_err(repo_err)?;
                ExpiryOutcome { expired, renewed: None, credited: Some(to_transaction(tx)?) }
            }
            ExpiryPlan::Complete { .. } => ExpiryOutcome { expired, renewed: None, credited: None },
        };

        txn.commit().await.map_err(repo_err)?;
        Ok(outcome)
    }

    async fn due_subscriptions(&self, now: DateTime<Utc>, skip: &[i64], limit: u64) -> Result<Vec<i64>, LedgerError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = now.into();
        let mut query = subscription::Entity::find()
            .select_only()
            .column(subscription::Column::Id)
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Active.as_str()))
            .filter(subscription::Column::EndDate.lte(now));
        if !skip.is_empty() {
            query = query.filter(subscription::Column::Id.is_not_in(skip.iter().copied()));
        }
        let ids: Vec<i64> = query
            .order_by_asc(subscription::Column::EndDate)
            .order_by_asc(subscription::Column::Id)
            .limit(limit)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(ids)
    }
}
