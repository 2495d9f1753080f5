use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::repository::LedgerRepository;
use super::service::LedgerService;

/// Spawn a task that expires due subscriptions every `every`.
/// The first tick fires immediately.
pub fn spawn_expiry_sweeper<R>(ledger: Arc<LedgerService<R>>, every: Duration) -> JoinHandle<()>
where
    R: LedgerRepository + ?Sized + 'static,
{
    info!(interval_secs = every.as_secs(), "expiry sweeper started");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = ledger.expire_due_subscriptions(Utc::now()).await {
                error!(code = e.code(), err = %e, "expiry sweep failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::domain::SubscriptionStatus;
    use crate::ledger::repository::mock::MockLedgerRepository;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn sweeper_expires_due_subscription_on_first_tick() {
        let repo = Arc::new(MockLedgerRepository::default());
        repo.seed_user(1);
        let plan = repo.seed_plan(30, dec!(1), dec!(100), true);
        let ledger = Arc::new(LedgerService::new(repo.clone()));
        let w = ledger.create_wallet(1).await.unwrap();
        let tx = ledger.deposit(w.id, dec!(10), None).await.unwrap();
        ledger.update_deposit_status(tx.id, "accepted").await.unwrap();
        let sub = ledger.create_subscription(w.id, plan, dec!(10), false).await.unwrap();
        repo.set_end_date(sub.id, Utc::now() - chrono::Duration::minutes(1));

        let handle = spawn_expiry_sweeper(ledger.clone(), Duration::from_secs(3600));
        let mut status = SubscriptionStatus::Active;
        for _ in 0..50 {
            status = ledger.get_subscription(sub.id).await.unwrap().status;
            if status != SubscriptionStatus::Active {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert_eq!(status, SubscriptionStatus::Completed);
    }
}
