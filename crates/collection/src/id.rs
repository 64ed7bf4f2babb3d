use std::fmt::{Display, Formatter, Result as FmtResult};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque identity of an item within one collection.
///
/// Assigned at insertion, never reused by the same collection, and only
/// meaningful for [`Collection::remove`](crate::Collection::remove).
/// Displays as a short base-36 token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut n = self.0;
        let mut digits = Vec::with_capacity(13);
        loop {
            digits.push(BASE36[(n % 36) as usize]);
            n /= 36;
            if n == 0 {
                break;
            }
        }
        digits.reverse();
        // Infallible: every byte comes from the ASCII alphabet above.
        f.write_str(std::str::from_utf8(&digits).unwrap_or_default())
    }
}

/// Monotonic id source owned by a single collection.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: u64,
}
impl IdGenerator {
    pub(crate) fn next_id(&mut self) -> ItemId {
        self.last += 1;
        ItemId::from_raw(self.last)
    }
}
