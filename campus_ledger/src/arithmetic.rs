//! Campus Ledger: Arithmetic Primitives
//!
//! Points are u64, registration counters are u32.
//! Every step is checked; callers decide whether overflow is a no-op.

/// Checked point credit. `None` on u64 overflow.
pub fn credit_points(balance: u64, amount: u64) -> Option<u64> {
    balance.checked_add(amount)
}

/// Checked point debit. `None` when the balance cannot cover `cost`.
pub fn debit_points(balance: u64, cost: u64) -> Option<u64> {
    balance.checked_sub(cost)
}

/// Checked +1 on a registration counter. `None` on u32 overflow.
pub fn bump_counter(count: u32) -> Option<u32> {
    count.checked_add(1)
}

/// True when `id` matches `[a-zA-Z0-9_-]+`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
