use criterion::{criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;
use std::sync::Arc;

use service::ledger::repository::mock::MockLedgerRepository;
use service::ledger::LedgerService;

fn bench_settlement(c: &mut Criterion) {
    let repo = Arc::new(MockLedgerRepository::default());
    repo.seed_user(1);
    let svc = LedgerService::new(repo);

    // create the wallet outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let wallet = rt.block_on(svc.create_wallet(1)).unwrap();

    c.bench_function("ledger_deposit_accept", |b| {
        b.iter(|| {
            rt.block_on(async {
                let tx = svc.deposit(wallet.id, dec!(1.5), None).await.unwrap();
                svc.update_deposit_status(tx.id, "accepted").await.unwrap();
            })
        });
    });

    c.bench_function("ledger_withdraw_reject", |b| {
        b.iter(|| {
            rt.block_on(async {
                let tx = svc.request_withdrawal(wallet.id, dec!(1), None).await.unwrap();
                svc.update_withdrawal_status(tx.id, "rejected").await.unwrap();
            })
        });
    });
}

criterion_group!(benches, bench_settlement);
criterion_main!(benches);
