//! Offset/limit pagination for listing queries
//!
//! Out-of-range limits and offsets are clamped, never rejected.

/// Largest offset the store can bind (a signed 64-bit `OFFSET`).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Pagination parameters as supplied by the caller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// requested page size; `<= 0` means "use the maximum"
    pub limit: i64,
    /// leading matching rows to skip; capped at `MAX_OFFSET`
    pub offset: u64,
}

impl Pagination {
    /// Clamp the limit into `1..=max_page_size` and convert to `u64`.
    /// A limit that is non-positive or above the maximum becomes the maximum.
    /// An offset beyond `MAX_OFFSET` is capped to it.
    pub fn normalize(self, max_page_size: u64) -> (u64, u64) {
        let max = max_page_size.max(1);
        let limit = match u64::try_from(self.limit) {
            Ok(l) if l >= 1 && l <= max => l,
            _ => max,
        };
        (limit, self.offset.min(MAX_OFFSET))
    }
}
