use diesel::prelude::*;
use crate::db::{snapshot::models::*, schema::bestseller_snapshots::dsl::*};

#[derive(Debug, thiserror::Error)]
pub enum InsertSnapshotError {
    #[error("InsertSnapshot: {source}")]
    InsertSnapshot {
        #[from]
        source: diesel::result::Error,
    },
}

/// Plain insert: the same list date fetched twice yields two rows.
pub fn insert_snapshot(
    conn: &mut PgConnection,
    new: &NewSnapshot,
) -> Result<Snapshot, InsertSnapshotError> {
    diesel::insert_into(bestseller_snapshots)
        .values(new)
        .get_result(conn)
        .map_err(|source| InsertSnapshotError::InsertSnapshot { source })
}

#[derive(Debug, thiserror::Error)]
pub enum CountSnapshotsError {
    #[error("CountSnapshots: {source}")]
    CountSnapshots {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn count_snapshots(
    conn: &mut PgConnection,
    list_name_val: &str,
) -> Result<i64, CountSnapshotsError> {
    bestseller_snapshots
        .filter(list_name.eq(list_name_val))
        .count()
        .get_result(conn)
        .map_err(|source| CountSnapshotsError::CountSnapshots { source })
}
