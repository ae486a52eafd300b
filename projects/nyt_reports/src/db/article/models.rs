use chrono::NaiveDateTime;
use uuid::Uuid;
use diesel::prelude::*;
use serde::Serialize;
use crate::db::schema::articles;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Article {
    pub id: Uuid,
    pub headline: String,
    pub web_url: String,
    pub pub_date: NaiveDateTime,
    pub news_desk: Option<String>,
    pub word_count: Option<i32>,
    pub keywords: Vec<String>,
}

/// Articles are loaded by a separate process; this exists for seeding.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticle<'a> {
    pub id: Uuid,
    pub headline: &'a str,
    pub web_url: &'a str,
    pub pub_date: NaiveDateTime,
    pub news_desk: Option<&'a str>,
    pub word_count: Option<i32>,
    pub keywords: Vec<&'a str>,
}

/// Projection scanned by the summary fold.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleRow {
    pub headline: String,
    pub web_url: String,
    pub pub_date: NaiveDateTime,
    pub news_desk: Option<String>,
    pub word_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleLink {
    pub headline: String,
    pub web_url: String,
}
