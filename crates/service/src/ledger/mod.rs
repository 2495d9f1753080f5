//! Wallet ledger: deposits, withdrawals, payouts and subscriptions.
//!
//! Three layers, same as the rest of the service crate:
//! - `domain`: types and pure settlement/expiry rules
//! - `repository`: persistence trait plus an in-memory implementation
//! - `service`: validation, logging and metrics around the repository
//!
//! `repo::seaorm` is the PostgreSQL repository.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod sweeper;

pub use errors::LedgerError;
pub use repository::LedgerRepository;
pub use service::LedgerService;
