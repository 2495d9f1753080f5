pub mod errors;
pub mod db;
pub mod user;
pub mod wallet;
pub mod transaction;
pub mod payout;
pub mod subscription_plan;
pub mod subscription;
pub mod blog_post;
pub mod testimonial;
pub mod crypto_news;
pub mod payment_gateway;
pub mod post_deposit;

pub use sea_orm::prelude::Decimal;

/// Money columns are `DECIMAL(20, 8)`.
pub const MONEY_PRECISION: (u32, u32) = (20, 8);
/// Rate columns are `DECIMAL(10, 4)`.
pub const RATE_PRECISION: (u32, u32) = (10, 4);

/// Whether `value` can be stored in a `DECIMAL(precision, scale)` column
/// without rounding or overflow.
pub fn fits_decimal(value: Decimal, (precision, scale): (u32, u32)) -> bool {
    let value = value.normalize();
    if value.scale() > scale {
        return false;
    }
    match 10i64.checked_pow(precision.saturating_sub(scale)) {
        Some(limit) => value.abs() < Decimal::from(limit),
        None => true,
    }
}

#[cfg(test)]
mod decimal_tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_bounds_follow_the_column() {
        assert!(fits_decimal(dec!(0.00000001), MONEY_PRECISION));
        assert!(fits_decimal(dec!(999999999999.99999999), MONEY_PRECISION));
        assert!(fits_decimal(dec!(12.500000000), MONEY_PRECISION));
        assert!(!fits_decimal(dec!(0.000000001), MONEY_PRECISION));
        assert!(!fits_decimal(dec!(1000000000000), MONEY_PRECISION));
        assert!(!fits_decimal(Decimal::MAX, MONEY_PRECISION));
    }

    #[test]
    fn rate_bounds_follow_the_column() {
        assert!(fits_decimal(dec!(999999.9999), RATE_PRECISION));
        assert!(!fits_decimal(dec!(1000000), RATE_PRECISION));
        assert!(!fits_decimal(dec!(1.23456), RATE_PRECISION));
    }
}

#[cfg(test)]
mod tests;
