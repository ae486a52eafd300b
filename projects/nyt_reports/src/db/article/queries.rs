use diesel::{
    connection::DefaultLoadingMode,
    dsl::sql,
    prelude::*,
    sql_types::{Bool, Text},
};
use crate::db::{article::models::*, schema::articles::dsl::*};
use crate::utils::summary::{ArticleSummary, SummaryBuilder};

pub const SEARCH_LIMIT: i64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum InsertArticleError {
    #[error("InsertArticle: {source}")]
    InsertArticle {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn insert_article(
    conn: &mut PgConnection,
    new: &NewArticle,
) -> Result<Article, InsertArticleError> {
    diesel::insert_into(articles)
        .values(new)
        .returning(Article::as_returning())
        .get_result(conn)
        .map_err(|source| InsertArticleError::InsertArticle { source })
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizeArticlesError {
    #[error("SummarizeArticles: {source}")]
    SummarizeArticles {
        #[from]
        source: diesel::result::Error,
    },
}

/// Streams every article once, in storage order, through the summary fold.
pub fn summarize_articles(
    conn: &mut PgConnection,
) -> Result<ArticleSummary, SummarizeArticlesError> {
    let rows = articles
        .select(ArticleRow::as_select())
        .load_iter::<ArticleRow, DefaultLoadingMode>(conn)
        .map_err(|source| SummarizeArticlesError::SummarizeArticles { source })?;

    let mut builder = SummaryBuilder::default();
    for row in rows {
        let row = row.map_err(|source| SummarizeArticlesError::SummarizeArticles { source })?;
        builder.push(row);
    }

    Ok(builder.finish())
}

#[derive(Debug, thiserror::Error)]
pub enum SearchArticlesError {
    #[error("SearchArticles: {source}")]
    SearchArticles {
        #[from]
        source: diesel::result::Error,
    },
}

/// First `limit` articles, in storage order, having a keyword that contains `query`
/// ignoring case. `query` is matched literally.
pub fn search_articles(
    conn: &mut PgConnection,
    query: &str,
    limit: i64,
) -> Result<Vec<ArticleLink>, SearchArticlesError> {
    let keyword_matches = sql::<Bool>("EXISTS (SELECT 1 FROM unnest(keywords) AS keyword WHERE keyword ILIKE ")
        .bind::<Text, _>(like_pattern(query))
        .sql(")");

    articles
        .filter(keyword_matches)
        .select(ArticleLink::as_select())
        .limit(limit)
        .load(conn)
        .map_err(|source| SearchArticlesError::SearchArticles { source })
}

/// Trimmed query, or `None` when there is nothing to search for.
pub fn normalize_query(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

/// `%query%` with LIKE metacharacters escaped, so any input is a valid pattern.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
