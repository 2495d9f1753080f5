//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - `ledger` owns every balance-affecting workflow; the `*_service`
//!   modules are plain CRUD.

pub mod errors;
pub mod pagination;
pub mod ledger;
pub mod user_service;
pub mod plan_service;
pub mod blog_service;
pub mod testimonial_service;
pub mod news_service;
pub mod payment_gateway_service;
pub mod post_deposit_service;
#[cfg(test)]
pub mod test_support;
