//! Quantity changes on a single stock record.
//!
//! Each function validates against the record it is given and returns an
//! updated copy; the input is never touched, so a failed call leaves the
//! caller's record exactly as it was. Persisting the copy, and making the
//! read-check-write atomic, is the caller's job.

use chrono::{DateTime, Utc};

use stockroom_core::{StockError, StockResult};

use crate::stock::{StockLevels, StockRecord, ThresholdPolicy};

/// Removes `amount` units from the record.
///
/// Checks run in this order: `amount <= 0` is [`StockError::InvalidQuantity`],
/// a missing record is [`StockError::StockNotFound`], and an amount above the
/// on-hand quantity is [`StockError::InsufficientStock`].
pub fn withdraw(
    record: Option<&StockRecord>,
    amount: i64,
    at: DateTime<Utc>,
) -> StockResult<StockRecord> {
    ensure_positive_amount("withdrawal", amount)?;
    let record = record.ok_or(StockError::StockNotFound)?;

    let available = record.quantity();
    if amount > available {
        return Err(StockError::insufficient(amount, available));
    }

    let levels = StockLevels {
        quantity: available - amount,
        ..record.levels()
    };
    Ok(record.with_levels(levels, at))
}

/// Adds `amount` received units to the record.
pub fn restock(
    record: Option<&StockRecord>,
    amount: i64,
    at: DateTime<Utc>,
) -> StockResult<StockRecord> {
    ensure_positive_amount("restock", amount)?;
    let record = record.ok_or(StockError::StockNotFound)?;

    let quantity = record
        .quantity()
        .checked_add(amount)
        .ok_or_else(|| StockError::invalid_quantity("restock overflows the stock quantity"))?;
    let levels = StockLevels {
        quantity,
        ..record.levels()
    };
    Ok(record.with_levels(levels, at))
}

/// Rejects a non-positive `amount` for the named operation.
///
/// Needs no record, so callers can fail fast before loading or locking one.
pub fn ensure_positive_amount(operation: &str, amount: i64) -> StockResult<()> {
    if amount <= 0 {
        return Err(StockError::invalid_quantity(format!(
            "{operation} amount must be greater than zero (got {amount})"
        )));
    }
    Ok(())
}

/// Replaces quantity and both thresholds, as the stock edit form does.
pub fn update_levels(
    record: &StockRecord,
    levels: StockLevels,
    policy: ThresholdPolicy,
    at: DateTime<Utc>,
) -> StockResult<StockRecord> {
    levels.ensure_non_negative()?;
    if policy == ThresholdPolicy::Enforce {
        levels.ensure_thresholds()?;
    }
    Ok(record.with_levels(levels, at))
}

/// Parses a quantity typed by an operator.
///
/// Surrounding whitespace is ignored. Blank or non-integer text is an
/// [`StockError::InvalidQuantity`]; sign checks are left to the operation.
pub fn parse_quantity(text: &str) -> StockResult<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StockError::invalid_quantity("quantity is required"));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| StockError::invalid_quantity(format!("not a whole number: {trimmed:?}")))
}
