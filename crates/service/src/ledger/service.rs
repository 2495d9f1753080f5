use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use common::metrics;

use super::domain::{
    self, Decision, ExpiryOutcome, NewSubscription, Payout, PayoutFilter, Subscription, Transaction, TransactionFilter,
    TransactionKind, Wallet,
};
use super::errors::LedgerError;
use super::repository::LedgerRepository;
use crate::pagination::Pagination;

/// Rows fetched per batch by [`LedgerService::expire_due_subscriptions`].
pub const EXPIRY_BATCH: u64 = 200;

/// Summary of one expiry sweep.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct SweepReport {
    pub completed: u32,
    pub reinvested: u32,
    pub failed: u32,
}

/// Wallet ledger business service independent of web framework
pub struct LedgerService<R: LedgerRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: LedgerRepository + ?Sized> LedgerService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Open a zero-balance wallet for an existing user.
    ///
    /// # Examples
    /// ```
    /// use service::ledger::{LedgerService, repository::mock::MockLedgerRepository};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockLedgerRepository::default());
    /// repo.seed_user(7);
    /// let svc = LedgerService::new(repo);
    /// let wallet = tokio_test::block_on(svc.create_wallet(7)).unwrap();
    /// assert!(wallet.balance.is_zero());
    /// ```
    #[instrument(skip(self))]
    pub async fn create_wallet(&self, user_id: i64) -> Result<Wallet, LedgerError> {
        if !self.repo.user_exists(user_id).await? {
            return Err(LedgerError::NotFound("user"));
        }
        let wallet = self.repo.create_wallet(user_id).await?;
        info!(wallet_id = wallet.id, user_id, "wallet_created");
        Ok(wallet)
    }

    pub async fn get_wallet(&self, id: i64) -> Result<Wallet, LedgerError> {
        self.repo.find_wallet(id).await?.ok_or(LedgerError::WalletNotFound)
    }

    pub async fn get_wallet_by_user(&self, user_id: i64) -> Result<Wallet, LedgerError> {
        self.repo.find_wallet_by_user(user_id).await?.ok_or(LedgerError::WalletNotFound)
    }

    /// Record a pending deposit. The balance is untouched until it is accepted.
    #[instrument(skip(self, reference))]
    pub async fn deposit(&self, wallet_id: i64, amount: Decimal, reference: Option<String>) -> Result<Transaction, LedgerError> {
        domain::validate_amount(amount)?;
        self.get_wallet(wallet_id).await?;
        let tx = self
            .repo
            .insert_pending_transaction(wallet_id, TransactionKind::Deposit, amount, reference)
            .await?;
        metrics::record_ledger_request("deposit");
        info!(transaction_id = tx.id, wallet_id, %amount, "deposit_requested");
        Ok(tx)
    }

    /// Record a pending withdrawal if the current balance covers it.
    #[instrument(skip(self, reference))]
    pub async fn request_withdrawal(&self, wallet_id: i64, amount: Decimal, reference: Option<String>) -> Result<Transaction, LedgerError> {
        domain::validate_amount(amount)?;
        let wallet = self.repo.find_wallet(wallet_id).await?.ok_or(LedgerError::InsufficientBalance)?;
        domain::ensure_covers(wallet.balance, amount)?;
        let tx = self
            .repo
            .insert_pending_transaction(wallet_id, TransactionKind::Withdrawal, amount, reference)
            .await?;
        metrics::record_ledger_request("withdrawal");
        info!(transaction_id = tx.id, wallet_id, %amount, "withdrawal_requested");
        Ok(tx)
    }

    /// Accept or reject a pending deposit; accepting credits the wallet.
    #[instrument(skip(self))]
    pub async fn update_deposit_status(&self, transaction_id: i64, status: &str) -> Result<(Transaction, Wallet), LedgerError> {
        self.settle(transaction_id, TransactionKind::Deposit, status).await
    }

    /// Accept or reject a pending withdrawal; accepting debits the wallet.
    #[instrument(skip(self))]
    pub async fn update_withdrawal_status(&self, transaction_id: i64, status: &str) -> Result<(Transaction, Wallet), LedgerError> {
        self.settle(transaction_id, TransactionKind::Withdrawal, status).await
    }

    async fn settle(&self, id: i64, kind: TransactionKind, status: &str) -> Result<(Transaction, Wallet), LedgerError> {
        let decision = Decision::parse(status)?;
        match self.repo.settle_transaction(id, kind, decision).await {
            Ok((tx, wallet)) => {
                metrics::record_settlement(kind.as_str(), tx.status.as_str());
                info!(
                    transaction_id = tx.id,
                    wallet_id = wallet.id,
                    amount = %tx.amount,
                    status = %tx.status,
                    balance = %wallet.balance,
                    "{}_settled",
                    kind
                );
                Ok((tx, wallet))
            }
            Err(e) => {
                metrics::record_settlement(kind.as_str(), "failed");
                warn!(transaction_id = id, code = e.code(), err = %e, "settlement refused");
                Err(e)
            }
        }
    }

    pub async fn get_transaction(&self, id: i64) -> Result<Transaction, LedgerError> {
        self.repo.find_transaction(id).await?.ok_or(LedgerError::NotFound("transaction"))
    }

    pub async fn list_transactions(&self, filter: &TransactionFilter, page: Pagination) -> Result<Vec<Transaction>, LedgerError> {
        let (offset, limit) = page.window();
        self.repo.list_transactions(filter, offset, limit).await
    }

    /// Record a pending payout if the current balance covers it.
    #[instrument(skip(self, destination))]
    pub async fn request_payout(&self, wallet_id: i64, amount: Decimal, destination: Option<String>) -> Result<Payout, LedgerError> {
        domain::validate_amount(amount)?;
        let wallet = self.repo.find_wallet(wallet_id).await?.ok_or(LedgerError::InsufficientBalance)?;
        domain::ensure_covers(wallet.balance, amount)?;
        let p = self.repo.insert_pending_payout(wallet_id, amount, destination).await?;
        metrics::record_ledger_request("payout");
        info!(payout_id = p.id, wallet_id, %amount, "payout_requested");
        Ok(p)
    }

    #[instrument(skip(self))]
    pub async fn update_payout_status(&self, payout_id: i64, status: &str) -> Result<(Payout, Wallet), LedgerError> {
        let decision = Decision::parse(status)?;
        match self.repo.settle_payout(payout_id, decision).await {
            Ok((p, wallet)) => {
                metrics::record_settlement("payout", p.status.as_str());
                info!(payout_id = p.id, wallet_id = wallet.id, amount = %p.amount, status = %p.status, balance = %wallet.balance, "payout_settled");
                Ok((p, wallet))
            }
            Err(e) => {
                metrics::record_settlement("payout", "failed");
                warn!(payout_id, code = e.code(), err = %e, "payout settlement refused");
                Err(e)
            }
        }
    }

    pub async fn get_payout(&self, id: i64) -> Result<Payout, LedgerError> {
        self.repo.find_payout(id).await?.ok_or(LedgerError::NotFound("payout"))
    }

    pub async fn list_payouts(&self, filter: &PayoutFilter, page: Pagination) -> Result<Vec<Payout>, LedgerError> {
        let (offset, limit) = page.window();
        self.repo.list_payouts(filter, offset, limit).await
    }

    /// Accrue earnings on an active subscription. The wallet balance is
    /// untouched; earnings reach it on expiry.
    #[instrument(skip(self))]
    pub async fn add_earnings(&self, subscription_id: i64, amount: Decimal) -> Result<(Subscription, Transaction), LedgerError> {
        domain::validate_amount(amount)?;
        let (sub, tx) = self.repo.add_earnings(subscription_id, amount).await?;
        metrics::record_ledger_request("earning");
        info!(subscription_id, transaction_id = tx.id, %amount, earnings = %sub.earnings, "earnings_added");
        Ok((sub, tx))
    }

    /// Enroll a wallet in a plan, starting now.
    #[instrument(skip(self))]
    pub async fn create_subscription(&self, wallet_id: i64, plan_id: i64, amount: Decimal, reinvest: bool) -> Result<Subscription, LedgerError> {
        self.create_subscription_at(wallet_id, plan_id, amount, reinvest, Utc::now()).await
    }

    pub async fn create_subscription_at(
        &self,
        wallet_id: i64,
        plan_id: i64,
        amount: Decimal,
        reinvest: bool,
        start: DateTime<Utc>,
    ) -> Result<Subscription, LedgerError> {
        let wallet = self.get_wallet(wallet_id).await?;
        let plan = self.repo.find_plan(plan_id).await?.ok_or(LedgerError::NotFound("plan"))?;
        domain::check_investment(&plan, amount, wallet.balance)?;
        let sub = self
            .repo
            .insert_subscription(NewSubscription {
                wallet_id,
                plan_id,
                amount,
                reinvest,
                start_date: start,
                end_date: domain::end_date(start, plan.duration_days),
                renewed_from: None,
            })
            .await?;
        info!(subscription_id = sub.id, wallet_id, plan_id, %amount, end_date = %sub.end_date, "subscription_created");
        Ok(sub)
    }

    pub async fn get_subscription(&self, id: i64) -> Result<Subscription, LedgerError> {
        self.repo.find_subscription(id).await?.ok_or(LedgerError::NotFound("subscription"))
    }

    pub async fn list_subscriptions(&self, wallet_id: Option<i64>, page: Pagination) -> Result<Vec<Subscription>, LedgerError> {
        let (offset, limit) = page.window();
        self.repo.list_subscriptions(wallet_id, offset, limit).await
    }

    #[instrument(skip(self))]
    pub async fn set_reinvest(&self, subscription_id: i64, reinvest: bool) -> Result<Subscription, LedgerError> {
        let sub = self.repo.set_reinvest(subscription_id, reinvest).await?;
        debug!(subscription_id, reinvest, "reinvest_updated");
        Ok(sub)
    }

    /// Expire one subscription whose end date has passed.
    #[instrument(skip(self))]
    pub async fn handle_subscription_expiration(&self, subscription_id: i64, now: DateTime<Utc>) -> Result<ExpiryOutcome, LedgerError> {
        let outcome = self.repo.expire_subscription(subscription_id, now).await?;
        let label = outcome.expired.status.as_str();
        metrics::record_expiry(label);
        match (&outcome.renewed, &outcome.credited) {
            (Some(next), _) => info!(subscription_id, renewed_id = next.id, amount = %next.amount, "subscription_reinvested"),
            (None, Some(tx)) => info!(subscription_id, transaction_id = tx.id, amount = %tx.amount, "subscription_completed"),
            (None, None) => info!(subscription_id, "subscription_completed_without_earnings"),
        }
        Ok(outcome)
    }

    /// Expire every due subscription, logging and skipping individual failures.
    /// Works through the backlog in batches; failed ids are left out of later
    /// batches so they cannot hold up the rest.
    #[instrument(skip(self))]
    pub async fn expire_due_subscriptions(&self, now: DateTime<Utc>) -> Result<SweepReport, LedgerError> {
        let mut report = SweepReport::default();
        let mut failed_ids: Vec<i64> = Vec::new();
        loop {
            let due = self.repo.due_subscriptions(now, &failed_ids, EXPIRY_BATCH).await?;
            let full_batch = due.len() as u64 >= EXPIRY_BATCH;
            for id in due {
                match self.handle_subscription_expiration(id, now).await {
                    Ok(o) if o.renewed.is_some() => report.reinvested += 1,
                    Ok(_) => report.completed += 1,
                    Err(e) => {
                        report.failed += 1;
                        failed_ids.push(id);
                        metrics::record_expiry("failed");
                        warn!(subscription_id = id, code = e.code(), err = %e, "expiry failed; skipping");
                    }
                }
            }
            if !full_batch {
                break;
            }
        }
        if report != SweepReport::default() {
            info!(completed = report.completed, reinvested = report.reinvested, failed = report.failed, "expiry_sweep_done");
        }
        Ok(report)
    }
}
