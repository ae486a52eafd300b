use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;
use diesel::prelude::*;
use serde_json::Value;
use crate::db::schema::bestseller_snapshots;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = bestseller_snapshots)]
pub struct Snapshot {
    pub id: Uuid,
    pub list_name: String,
    pub list_date: NaiveDate,
    pub body: Value,
    pub fetched_at: NaiveDateTime,
}

/// One raw list response, stored verbatim in `body`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bestseller_snapshots)]
pub struct NewSnapshot<'a> {
    pub id: Uuid,
    pub list_name: &'a str,
    pub list_date: NaiveDate,
    pub body: &'a Value,
    pub fetched_at: NaiveDateTime,
}
