//! Behaviour shared by collection and mint records

use crate::identity::{Address, RecordId};
use crate::time::Timestamp;

/// A persisted record owned by a wallet address
pub trait Record {
    /// Primary key
    fn id(&self) -> &RecordId;

    /// Owning wallet address
    fn owner(&self) -> &Address;

    /// Creation time
    fn created_at(&self) -> Timestamp;
}

/// Sort records newest first by creation time.
///
/// Ties fall back to descending id, which also orders by generation time.
pub fn newest_first<T: Record>(records: &mut [T]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(a.id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Collection, NewCollection};
    use chrono::Duration;

    #[test]
    fn test_newest_first() {
        let mut older = Collection::new(NewCollection::default());
        older.created_at = older.created_at - Duration::hours(1);
        let newer = Collection::new(NewCollection::default());
        let mut records = vec![older.clone(), newer.clone()];

        newest_first(&mut records);
        assert_eq!(records[0].id, newer.id);
        assert_eq!(records[1].id, older.id);
    }
}
