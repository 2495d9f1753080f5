use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::domain::{
    Decision, ExpiryOutcome, NewSubscription, Payout, PayoutFilter, PlanTerms, Subscription, Transaction,
    TransactionFilter, TransactionKind, RequestStatus, Wallet,
};
use super::errors::LedgerError;

/// Persistence for the wallet ledger.
///
/// `settle_*`, `add_earnings` and `expire_subscription` are atomic: they either
/// apply every row change or none, and concurrent calls on the same rows are
/// serialized.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn user_exists(&self, user_id: i64) -> Result<bool, LedgerError>;

    async fn create_wallet(&self, user_id: i64) -> Result<Wallet, LedgerError>;
    async fn find_wallet(&self, id: i64) -> Result<Option<Wallet>, LedgerError>;
    async fn find_wallet_by_user(&self, user_id: i64) -> Result<Option<Wallet>, LedgerError>;

    async fn insert_pending_transaction(
        &self,
        wallet_id: i64,
        kind: TransactionKind,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<Transaction, LedgerError>;
    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>, LedgerError>;
    async fn list_transactions(&self, filter: &TransactionFilter, offset: u64, limit: u64) -> Result<Vec<Transaction>, LedgerError>;
    /// Decide a pending transaction of `kind` and apply its balance effect.
    async fn settle_transaction(&self, id: i64, kind: TransactionKind, decision: Decision) -> Result<(Transaction, Wallet), LedgerError>;

    async fn insert_pending_payout(&self, wallet_id: i64, amount: Decimal, destination: Option<String>) -> Result<Payout, LedgerError>;
    async fn find_payout(&self, id: i64) -> Result<Option<Payout>, LedgerError>;
    async fn list_payouts(&self, filter: &PayoutFilter, offset: u64, limit: u64) -> Result<Vec<Payout>, LedgerError>;
    async fn settle_payout(&self, id: i64, decision: Decision) -> Result<(Payout, Wallet), LedgerError>;

    async fn find_plan(&self, id: i64) -> Result<Option<PlanTerms>, LedgerError>;
    async fn insert_subscription(&self, new: NewSubscription) -> Result<Subscription, LedgerError>;
    async fn find_subscription(&self, id: i64) -> Result<Option<Subscription>, LedgerError>;
    async fn list_subscriptions(&self, wallet_id: Option<i64>, offset: u64, limit: u64) -> Result<Vec<Subscription>, LedgerError>;
    /// Toggle reinvest on an active subscription.
    async fn set_reinvest(&self, id: i64, reinvest: bool) -> Result<Subscription, LedgerError>;
    async fn add_earnings(&self, subscription_id: i64, amount: Decimal) -> Result<(Subscription, Transaction), LedgerError>;
    async fn expire_subscription(&self, id: i64, now: DateTime<Utc>) -> Result<ExpiryOutcome, LedgerError>;
    /// Ids of active subscriptions with `end_date <= now`, oldest first,
    /// leaving out `skip`.
    async fn due_subscriptions(&self, now: DateTime<Utc>, skip: &[i64], limit: u64) -> Result<Vec<i64>, LedgerError>;
}

/// In-memory repository for tests, benches and doc examples.
///
/// One mutex guards all state, so every operation is trivially atomic.
pub mod mock {
    use super::*;
    use crate::ledger::domain::{self, ExpiryPlan, SubscriptionStatus};
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        next_id: i64,
        users: HashSet<i64>,
        wallets: BTreeMap<i64, Wallet>,
        transactions: BTreeMap<i64, Transaction>,
        payouts: BTreeMap<i64, Payout>,
        plans: BTreeMap<i64, PlanTerms>,
        subscriptions: BTreeMap<i64, Subscription>,
    }

    impl State {
        fn next_id(&mut self) -> i64 {
            self.next_id += 1;
            self.next_id
        }

        fn wallet_mut(&mut self, id: i64) -> Result<&mut Wallet, LedgerError> {
            self.wallets.get_mut(&id).ok_or(LedgerError::WalletNotFound)
        }

        fn push_transaction(
            &mut self,
            wallet_id: i64,
            kind: TransactionKind,
            amount: Decimal,
            status: RequestStatus,
            reference: Option<String>,
            subscription_id: Option<i64>,
        ) -> Transaction {
            let now = Utc::now();
            let tx = Transaction {
                id: self.next_id(),
                wallet_id,
                kind,
                amount,
                status,
                reference,
                subscription_id,
                processed_at: (status != RequestStatus::Pending).then_some(now),
                created_at: now,
            };
            self.transactions.insert(tx.id, tx.clone());
            tx
        }

        fn push_subscription(&mut self, new: NewSubscription) -> Subscription {
            let sub = Subscription {
                id: self.next_id(),
                wallet_id: new.wallet_id,
                plan_id: new.plan_id,
                amount: new.amount,
                earnings: Decimal::ZERO,
                reinvest: new.reinvest,
                status: SubscriptionStatus::Active,
                start_date: new.start_date,
                end_date: new.end_date,
                renewed_from: new.renewed_from,
            };
            self.subscriptions.insert(sub.id, sub.clone());
            sub
        }
    }

    #[derive(Default)]
    pub struct MockLedgerRepository {
        state: Mutex<State>,
    }

    impl MockLedgerRepository {
        fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, LedgerError> {
            self.state.lock().map_err(|_| LedgerError::Repository("ledger state poisoned".into()))
        }

        /// Register a user id so wallets can be created for it.
        pub fn seed_user(&self, user_id: i64) {
            if let Ok(mut s) = self.lock() {
                s.users.insert(user_id);
            }
        }

        /// Insert a plan and return its id.
        pub fn seed_plan(&self, duration_days: i32, min_investment: Decimal, max_investment: Decimal, is_active: bool) -> i64 {
            let Ok(mut s) = self.lock() else { return 0 };
            let id = s.next_id();
            s.plans.insert(id, PlanTerms { id, duration_days, min_investment, max_investment, is_active });
            id
        }

        /// Remove a plan, e.g. to make reinvesting its subscriptions fail.
        pub fn drop_plan(&self, plan_id: i64) {
            if let Ok(mut s) = self.lock() {
                s.plans.remove(&plan_id);
            }
        }

        /// Move a subscription's end date, e.g. into the past to make it due.
        pub fn set_end_date(&self, subscription_id: i64, end_date: DateTime<Utc>) {
            if let Ok(mut s) = self.lock() {
                if let Some(sub) = s.subscriptions.get_mut(&subscription_id) {
                    sub.end_date = end_date;
                }
            }
        }
    }

    fn window<T: Clone>(items: impl Iterator<Item = T>, offset: u64, limit: u64) -> Vec<T> {
        items.skip(offset as usize).take(limit as usize).collect()
    }

    #[async_trait]
    impl LedgerRepository for MockLedgerRepository {
        async fn user_exists(&self, user_id: i64) -> Result<bool, LedgerError> {
            Ok(self.lock()?.users.contains(&user_id))
        }

        async fn create_wallet(&self, user_id: i64) -> Result<Wallet, LedgerError> {
            let mut s = self.lock()?;
            if s.wallets.values().any(|w| w.user_id == user_id) {
                return Err(LedgerError::Conflict("wallet already exists for user".into()));
            }
            let now = Utc::now();
            let w = Wallet { id: s.next_id(), user_id, balance: Decimal::ZERO, created_at: now, updated_at: now };
            s.wallets.insert(w.id, w.clone());
            Ok(w)
        }

        async fn find_wallet(&self, id: i64) -> Result<Option<Wallet>, LedgerError> {
            Ok(self.lock()?.wallets.get(&id).cloned())
        }

        async fn find_wallet_by_user(&self, user_id: i64) -> Result<Option<Wallet>, LedgerError> {
            Ok(self.lock()?.wallets.values().find(|w| w.user_id == user_id).cloned())
        }

        async fn insert_pending_transaction(
            &self,
            wallet_id: i64,
            kind: TransactionKind,
            amount: Decimal,
            reference: Option<String>,
        ) -> Result<Transaction, LedgerError> {
            let mut s = self.lock()?;
            s.wallet_mut(wallet_id)?;
            Ok(s.push_transaction(wallet_id, kind, amount, RequestStatus::Pending, reference, None))
        }

        async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>, LedgerError> {
            Ok(self.lock()?.transactions.get(&id).cloned())
        }

        async fn list_transactions(&self, filter: &TransactionFilter, offset: u64, limit: u64) -> Result<Vec<Transaction>, LedgerError> {
            let s = self.lock()?;
            let matching = s.transactions.values().rev().filter(|t| {
                filter.wallet_id.map_or(true, |w| t.wallet_id == w)
                    && filter.kind.map_or(true, |k| t.kind == k)
                    && filter.status.map_or(true, |st| t.status == st)
            });
            Ok(window(matching.cloned(), offset, limit))
        }

        async fn settle_transaction(&self, id: i64, kind: TransactionKind, decision: Decision) -> Result<(Transaction, Wallet), LedgerError> {
            let mut s = self.lock()?;
            let tx = match s.transactions.get(&id) {
                Some(t) if t.kind == kind => t.clone(),
                _ => return Err(LedgerError::NotFoundOrProcessed(kind.as_str())),
            };
            domain::ensure_pending(tx.status, kind.as_str())?;
            let effect = kind.effect().ok_or(LedgerError::NotFoundOrProcessed(kind.as_str()))?;
            let wallet = s.wallet_mut(tx.wallet_id)?;
            let balance = domain::settle(effect, wallet.balance, tx.amount, decision)?;
            let now = Utc::now();
            wallet.balance = balance;
            wallet.updated_at = now;
            let wallet = wallet.clone();
            let tx = s.transactions.get_mut(&id).ok_or(LedgerError::NotFoundOrProcessed(kind.as_str()))?;
            tx.status = decision.status();
            tx.processed_at = Some(now);
            Ok((tx.clone(), wallet))
        }

        async fn insert_pending_payout(&self, wallet_id: i64, amount: Decimal, destination: Option<String>) -> Result<Payout, LedgerError> {
            let mut s = self.lock()?;
            s.wallet_mut(wallet_id)?;
            let p = Payout {
                id: s.next_id(),
                wallet_id,
                amount,
                status: RequestStatus::Pending,
                destination,
                processed_at: None,
                created_at: Utc::now(),
            };
            s.payouts.insert(p.id, p.clone());
            Ok(p)
        }

        async fn find_payout(&self, id: i64) -> Result<Option<Payout>, LedgerError> {
            Ok(self.lock()?.payouts.get(&id).cloned())
        }

        async fn list_payouts(&self, filter: &PayoutFilter, offset: u64, limit: u64) -> Result<Vec<Payout>, LedgerError> {
            let s = self.lock()?;
            let matching = s.payouts.values().rev().filter(|p| {
                filter.wallet_id.map_or(true, |w| p.wallet_id == w) && filter.status.map_or(true, |st| p.status == st)
            });
            Ok(window(matching.cloned(), offset, limit))
        }

        async fn settle_payout(&self, id: i64, decision: Decision) -> Result<(Payout, Wallet), LedgerError> {
            let mut s = self.lock()?;
            let p = s.payouts.get(&id).cloned().ok_or(LedgerError::NotFoundOrProcessed("payout"))?;
            domain::ensure_pending(p.status, "payout")?;
            let wallet = s.wallet_mut(p.wallet_id)?;
            let balance = domain::settle(domain::BalanceEffect::Debit, wallet.balance, p.amount, decision)?;
            let now = Utc::now();
            wallet.balance = balance;
            wallet.updated_at = now;
            let wallet = wallet.clone();
            let p = s.payouts.get_mut(&id).ok_or(LedgerError::NotFoundOrProcessed("payout"))?;
            p.status = decision.status();
            p.processed_at = Some(now);
            Ok((p.clone(), wallet))
        }

        async fn find_plan(&self, id: i64) -> Result<Option<PlanTerms>, LedgerError> {
            Ok(self.lock()?.plans.get(&id).cloned())
        }

        async fn insert_subscription(&self, new: NewSubscription) -> Result<Subscription, LedgerError> {
            let mut s = self.lock()?;
            s.wallet_mut(new.wallet_id)?;
            if !s.plans.contains_key(&new.plan_id) {
                return Err(LedgerError::NotFound("plan"));
            }
            Ok(s.push_subscription(new))
        }

        async fn find_subscription(&self, id: i64) -> Result<Option<Subscription>, LedgerError> {
            Ok(self.lock()?.subscriptions.get(&id).cloned())
        }

        async fn list_subscriptions(&self, wallet_id: Option<i64>, offset: u64, limit: u64) -> Result<Vec<Subscription>, LedgerError> {
            let s = self.lock()?;
            let matching = s.subscriptions.values().rev().filter(|x| wallet_id.map_or(true, |w| x.wallet_id == w));
            Ok(window(matching.cloned(), offset, limit))
        }

        async fn set_reinvest(&self, id: i64, reinvest: bool) -> Result<Subscription, LedgerError> {
            let mut s = self.lock()?;
            let sub = s.subscriptions.get_mut(&id).ok_or(LedgerError::NotFoundOrProcessed("subscription"))?;
            domain::ensure_active(sub)?;
            sub.reinvest = reinvest;
            Ok(sub.clone())
        }

        async fn add_earnings(&self, subscription_id: i64, amount: Decimal) -> Result<(Subscription, Transaction), LedgerError> {
            let mut s = self.lock()?;
            let sub = s
                .subscriptions
                .get_mut(&subscription_id)
                .ok_or(LedgerError::NotFoundOrProcessed("subscription"))?;
            domain::ensure_active(sub)?;
            sub.earnings += amount;
            let sub = sub.clone();
            let tx = s.push_transaction(
                sub.wallet_id,
                TransactionKind::Earning,
                amount,
                RequestStatus::Accepted,
                Some(format!("subscription:{subscription_id}")),
                Some(subscription_id),
            );
            Ok((sub, tx))
        }

        async fn expire_subscription(&self, id: i64, now: DateTime<Utc>) -> Result<ExpiryOutcome, LedgerError> {
            let mut s = self.lock()?;
            let current = s.subscriptions.get(&id).cloned().ok_or(LedgerError::NotFoundOrProcessed("subscription"))?;
            match domain::plan_expiry(&current, now)? {
                ExpiryPlan::Reinvest { amount } => {
                    let plan = s.plans.get(&current.plan_id).cloned().ok_or(LedgerError::NotFound("plan"))?;
                    let expired = {
                        let sub = s.subscriptions.get_mut(&id).ok_or(LedgerError::NotFoundOrProcessed("subscription"))?;
                        sub.status = SubscriptionStatus::Reinvested;
                        sub.clone()
                    };
                    let renewed = s.push_subscription(NewSubscription {
                        wallet_id: current.wallet_id,
                        plan_id: current.plan_id,
                        amount,
                        reinvest: current.reinvest,
                        start_date: now,
                        end_date: domain::end_date(now, plan.duration_days),
                        renewed_from: Some(id),
                    });
                    Ok(ExpiryOutcome { expired, renewed: Some(renewed), credited: None })
                }
                ExpiryPlan::Complete { payout } => {
                    let balance = s.wallet_mut(current.wallet_id)?.balance;
                    let credited_balance =
                        domain::settle(domain::BalanceEffect::Credit, balance, payout, Decision::Accept)?;
                    let expired = {
                        let sub = s.subscriptions.get_mut(&id).ok_or(LedgerError::NotFoundOrProcessed("subscription"))?;
                        sub.status = SubscriptionStatus::Completed;
                        sub.clone()
                    };
                    let credited = if payout > Decimal::ZERO {
                        let wallet = s.wallet_mut(current.wallet_id)?;
                        wallet.balance = credited_balance;
                        wallet.updated_at = now;
                        Some(s.push_transaction(
                            current.wallet_id,
                            TransactionKind::Deposit,
                            payout,
                            RequestStatus::Accepted,
                            Some(format!("subscription:{id} earnings")),
                            Some(id),
                        ))
                    } else {
                        None
                    };
                    Ok(ExpiryOutcome { expired, renewed: None, credited })
                }
            }
        }

        async fn due_subscriptions(&self, now: DateTime<Utc>, skip: &[i64], limit: u64) -> Result<Vec<i64>, LedgerError> {
            let s = self.lock()?;
            let mut due: Vec<&Subscription> = s
                .subscriptions
                .values()
                .filter(|x| x.status == SubscriptionStatus::Active && x.end_date <= now && !skip.contains(&x.id))
                .collect();
            due.sort_by_key(|x| (x.end_date, x.id));
            Ok(due.into_iter().take(limit as usize).map(|x| x.id).collect())
        }
    }
}
