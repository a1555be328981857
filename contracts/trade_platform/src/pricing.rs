use crate::error::Error;
use crate::storage::{MAX_SALE_SUPPLY, PRICE_INCREMENT};

/// Price of the next sale round
///
/// Formula: next = previous × 1.03 + PRICE_INCREMENT, truncated
///
/// Example:
/// - previous: 0.00001
/// - next: 0.00001 × 1.03 + 0.000004 = 0.0000143
pub fn next_unit_price(previous: i128) -> Result<i128, Error> {
    previous
        .checked_mul(103)
        .map(|scaled| scaled / 100)
        .and_then(|grown| grown.checked_add(PRICE_INCREMENT))
        .ok_or(Error::ArithmeticOverflow)
}

/// Tokens to mint for a sale round backed by `carry_over_value`
///
/// Formula: supply = carry_over_value / unit_price, truncated and capped at
/// `MAX_SALE_SUPPLY`
pub fn sale_supply(carry_over_value: i128, unit_price: i128) -> Result<i128, Error> {
    if unit_price <= 0 {
        return Err(Error::InvalidPrice);
    }
    Ok((carry_over_value / unit_price).min(MAX_SALE_SUPPLY))
}

/// Cost of `amount` tokens at `unit_price`
pub fn cost_of(amount: i128, unit_price: i128) -> Result<i128, Error> {
    amount
        .checked_mul(unit_price)
        .ok_or(Error::ArithmeticOverflow)
}
