//! Ledger domain types and the pure rules every repository applies.
//!
//! Repositories load and lock rows, call into these functions, and persist
//! whatever they return. Nothing in here touches storage.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    /// Bookkeeping row for accrued subscription earnings; never moves the balance.
    Earning,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Earning => "earning",
        }
    }

    /// Balance effect when a pending row of this kind is accepted.
    pub fn effect(&self) -> Option<BalanceEffect> {
        match self {
            TransactionKind::Deposit => Some(BalanceEffect::Credit),
            TransactionKind::Withdrawal => Some(BalanceEffect::Debit),
            TransactionKind::Earning => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            "earning" => Ok(TransactionKind::Earning),
            other => Err(LedgerError::Validation(format!("unknown transaction kind '{other}'"))),
        }
    }
}

/// Approval status shared by transactions and payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RequestStatus {
    type Err = LedgerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(LedgerError::Validation(format!("unknown status '{other}'"))),
        }
    }
}

/// Admin decision on a pending request. `pending` is not a valid target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn parse(status: &str) -> Result<Self, LedgerError> {
        match status.trim().to_ascii_lowercase().as_str() {
            "accepted" => Ok(Decision::Accept),
            "rejected" => Ok(Decision::Reject),
            _ => Err(LedgerError::Validation("status must be 'accepted' or 'rejected'".into())),
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            Decision::Accept => RequestStatus::Accepted,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Completed,
    Reinvested,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Completed => "completed",
            SubscriptionStatus::Reinvested => "reinvested",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = LedgerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "completed" => Ok(SubscriptionStatus::Completed),
            "reinvested" => Ok(SubscriptionStatus::Reinvested),
            other => Err(LedgerError::Validation(format!("unknown subscription status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceEffect {
    Credit,
    Debit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub wallet_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub status: RequestStatus,
    pub reference: Option<String>,
    pub subscription_id: Option<i64>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: i64,
    pub wallet_id: i64,
    pub amount: Decimal,
    pub status: RequestStatus,
    pub destination: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The plan fields the ledger needs to open a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTerms {
    pub id: i64,
    pub duration_days: i32,
    pub min_investment: Decimal,
    pub max_investment: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub wallet_id: i64,
    pub plan_id: i64,
    pub amount: Decimal,
    pub earnings: Decimal,
    pub reinvest: bool,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub renewed_from: Option<i64>,
}

/// Insert payload for a subscription; dates already resolved.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub wallet_id: i64,
    pub plan_id: i64,
    pub amount: Decimal,
    pub reinvest: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub renewed_from: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub wallet_id: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoutFilter {
    pub wallet_id: Option<i64>,
    pub status: Option<RequestStatus>,
}

/// Result of expiring one subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiryOutcome {
    pub expired: Subscription,
    /// Follow-on subscription when the expired one was set to reinvest.
    pub renewed: Option<Subscription>,
    /// Accepted deposit carrying the earnings back to the wallet.
    pub credited: Option<Transaction>,
}

/// What expiring a subscription should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpiryPlan {
    Reinvest { amount: Decimal },
    Complete { payout: Decimal },
}

/// Positive and storable in a money column without rounding.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation("amount must be greater than zero".into()));
    }
    if !models::fits_decimal(amount, models::MONEY_PRECISION) {
        return Err(LedgerError::Validation(
            "amount must be below 1000000000000 with at most 8 decimal places".into(),
        ));
    }
    Ok(())
}

/// Only `pending` rows may be decided.
pub fn ensure_pending(current: RequestStatus, entity: &'static str) -> Result<(), LedgerError> {
    match current {
        RequestStatus::Pending => Ok(()),
        _ => Err(LedgerError::NotFoundOrProcessed(entity)),
    }
}

/// New balance after deciding a request of `amount`.
pub fn settle(effect: BalanceEffect, balance: Decimal, amount: Decimal, decision: Decision) -> Result<Decimal, LedgerError> {
    match (decision, effect) {
        (Decision::Reject, _) => Ok(balance),
        (Decision::Accept, BalanceEffect::Credit) => balance
            .checked_add(amount)
            .filter(|b| models::fits_decimal(*b, models::MONEY_PRECISION))
            .ok_or_else(|| LedgerError::Validation("balance would exceed the wallet limit".into())),
        (Decision::Accept, BalanceEffect::Debit) => {
            if balance < amount {
                return Err(LedgerError::InsufficientBalance);
            }
            Ok(balance - amount)
        }
    }
}

pub fn ensure_covers(balance: Decimal, amount: Decimal) -> Result<(), LedgerError> {
    if balance < amount {
        return Err(LedgerError::InsufficientBalance);
    }
    Ok(())
}

/// Plan must be active, the amount within its bounds and covered by the balance.
pub fn check_investment(plan: &PlanTerms, amount: Decimal, balance: Decimal) -> Result<(), LedgerError> {
    validate_amount(amount)?;
    if !plan.is_active {
        return Err(LedgerError::Validation("plan is not active".into()));
    }
    if amount < plan.min_investment || amount > plan.max_investment {
        return Err(LedgerError::Validation(format!(
            "amount must be between {} and {}",
            plan.min_investment.normalize(),
            plan.max_investment.normalize()
        )));
    }
    ensure_covers(balance, amount)
}

pub fn end_date(start: DateTime<Utc>, duration_days: i32) -> DateTime<Utc> {
    start + Duration::days(i64::from(duration_days))
}

pub fn plan_expiry(sub: &Subscription, now: DateTime<Utc>) -> Result<ExpiryPlan, LedgerError> {
    if sub.status != SubscriptionStatus::Active {
        return Err(LedgerError::NotFoundOrProcessed("subscription"));
    }
    if sub.end_date > now {
        return Err(LedgerError::NotExpired);
    }
    if sub.reinvest {
        Ok(ExpiryPlan::Reinvest { amount: sub.amount + sub.earnings })
    } else {
        Ok(ExpiryPlan::Complete { payout: sub.earnings })
    }
}

pub fn ensure_active(sub: &Subscription) -> Result<(), LedgerError> {
    if sub.status != SubscriptionStatus::Active {
        return Err(LedgerError::NotFoundOrProcessed("subscription"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sub(status: SubscriptionStatus, reinvest: bool, end: DateTime<Utc>) -> Subscription {
        Subscription {
            id: 1,
            wallet_id: 1,
            plan_id: 1,
            amount: dec!(100),
            earnings: dec!(7.5),
            reinvest,
            status,
            start_date: end - Duration::days(30),
            end_date: end,
            renewed_from: None,
        }
    }

    fn plan() -> PlanTerms {
        PlanTerms { id: 1, duration_days: 30, min_investment: dec!(50), max_investment: dec!(500), is_active: true }
    }

    #[test]
    fn decision_accepts_only_terminal_statuses() {
        assert_eq!(Decision::parse("accepted").unwrap(), Decision::Accept);
        assert_eq!(Decision::parse(" Rejected ").unwrap(), Decision::Reject);
        assert!(matches!(Decision::parse("pending"), Err(LedgerError::Validation(_))));
        assert!(Decision::parse("approved").is_err());
    }

    #[test]
    fn only_pending_can_be_decided() {
        assert!(ensure_pending(RequestStatus::Pending, "deposit").is_ok());
        assert_eq!(
            ensure_pending(RequestStatus::Accepted, "deposit"),
            Err(LedgerError::NotFoundOrProcessed("deposit"))
        );
        assert!(ensure_pending(RequestStatus::Rejected, "payout").is_err());
    }

    #[test]
    fn accepted_credit_adds_exact_amount() {
        assert_eq!(settle(BalanceEffect::Credit, dec!(10), dec!(2.5), Decision::Accept), Ok(dec!(12.5)));
    }

    #[test]
    fn amounts_must_fit_the_money_column() {
        assert!(validate_amount(dec!(0.00000001)).is_ok());
        assert!(validate_amount(dec!(999999999999.99999999)).is_ok());
        assert!(matches!(validate_amount(dec!(0.000000001)), Err(LedgerError::Validation(_))));
        assert!(matches!(validate_amount(dec!(10.123456789)), Err(LedgerError::Validation(_))));
        assert!(matches!(validate_amount(dec!(1000000000000)), Err(LedgerError::Validation(_))));
        assert!(matches!(validate_amount(Decimal::MAX), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn credit_cannot_overflow_the_balance_column() {
        let near_cap = dec!(999999999999);
        assert!(matches!(
            settle(BalanceEffect::Credit, near_cap, dec!(1), Decision::Accept),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(settle(BalanceEffect::Credit, near_cap, dec!(1), Decision::Reject), Ok(near_cap));
    }

    #[test]
    fn rejection_never_moves_balance() {
        assert_eq!(settle(BalanceEffect::Credit, dec!(10), dec!(5), Decision::Reject), Ok(dec!(10)));
        assert_eq!(settle(BalanceEffect::Debit, dec!(1), dec!(5), Decision::Reject), Ok(dec!(1)));
    }

    #[test]
    fn debit_cannot_overdraw() {
        assert_eq!(settle(BalanceEffect::Debit, dec!(10), dec!(10), Decision::Accept), Ok(dec!(0)));
        assert_eq!(
            settle(BalanceEffect::Debit, dec!(9.99), dec!(10), Decision::Accept),
            Err(LedgerError::InsufficientBalance)
        );
    }

    #[test]
    fn investment_bounds_and_balance() {
        let p = plan();
        assert!(check_investment(&p, dec!(50), dec!(50)).is_ok());
        assert!(matches!(check_investment(&p, dec!(49), dec!(1000)), Err(LedgerError::Validation(_))));
        assert!(matches!(check_investment(&p, dec!(501), dec!(1000)), Err(LedgerError::Validation(_))));
        assert_eq!(check_investment(&p, dec!(100), dec!(99)), Err(LedgerError::InsufficientBalance));
        let inactive = PlanTerms { is_active: false, ..p };
        assert!(check_investment(&inactive, dec!(100), dec!(1000)).is_err());
    }

    #[test]
    fn end_date_adds_whole_days() {
        let start = Utc::now();
        assert_eq!(end_date(start, 30) - start, Duration::days(30));
    }

    #[test]
    fn expiry_waits_for_end_date() {
        let now = Utc::now();
        let s = sub(SubscriptionStatus::Active, false, now + Duration::seconds(1));
        assert_eq!(plan_expiry(&s, now), Err(LedgerError::NotExpired));
    }

    #[test]
    fn expiry_reinvest_rolls_earnings_into_principal() {
        let now = Utc::now();
        let s = sub(SubscriptionStatus::Active, true, now);
        assert_eq!(plan_expiry(&s, now), Ok(ExpiryPlan::Reinvest { amount: dec!(107.5) }));
    }

    #[test]
    fn expiry_without_reinvest_pays_earnings() {
        let now = Utc::now();
        let s = sub(SubscriptionStatus::Active, false, now - Duration::days(1));
        assert_eq!(plan_expiry(&s, now), Ok(ExpiryPlan::Complete { payout: dec!(7.5) }));
    }

    #[test]
    fn expired_subscription_cannot_expire_twice() {
        let now = Utc::now();
        let s = sub(SubscriptionStatus::Completed, false, now - Duration::days(1));
        assert_eq!(plan_expiry(&s, now), Err(LedgerError::NotFoundOrProcessed("subscription")));
    }

    #[test]
    fn status_strings_round_trip_through_from_str() {
        for k in [TransactionKind::Deposit, TransactionKind::Withdrawal, TransactionKind::Earning] {
            assert_eq!(k.as_str().parse::<TransactionKind>().unwrap(), k);
        }
        assert!("bonus".parse::<TransactionKind>().is_err());
        assert_eq!("active".parse::<SubscriptionStatus>().unwrap(), SubscriptionStatus::Active);
    }
}
