use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::db::article::models::ArticleRow;

/// How many of the most recent articles the summary keeps.
pub const NEWEST_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSummary {
    pub total_articles: u64,
    /// Mean over articles that carry a word count; `None` when none do.
    pub average_word_count: Option<f64>,
    pub categories: Vec<CategoryCount>,
    pub newest: Vec<NewestArticle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// News desk label; `None` for articles filed without one.
    pub category: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewestArticle {
    pub headline: String,
    pub web_url: String,
    pub pub_date: NaiveDateTime,
}

impl ArticleSummary {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = ArticleRow>,
    {
        let mut builder = SummaryBuilder::default();
        for row in rows {
            builder.push(row);
        }
        builder.finish()
    }
}

/// Single-pass accumulator behind [`ArticleSummary`].
///
/// `newest` stays sorted by `pub_date` descending. Rows with equal dates keep
/// the order they were pushed in.
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    total: u64,
    word_count_sum: i64,
    word_count_seen: u64,
    categories: HashMap<Option<String>, u64>,
    newest: Vec<NewestArticle>,
}

impl SummaryBuilder {
    pub fn push(&mut self, row: ArticleRow) {
        self.total += 1;

        if let Some(words) = row.word_count {
            self.word_count_sum += i64::from(words);
            self.word_count_seen += 1;
        }

        *self.categories.entry(row.news_desk).or_insert(0) += 1;

        let position = self
            .newest
            .iter()
            .position(|kept| kept.pub_date < row.pub_date)
            .unwrap_or(self.newest.len());

        if position < NEWEST_LIMIT {
            self.newest.insert(
                position,
                NewestArticle {
                    headline: row.headline,
                    web_url: row.web_url,
                    pub_date: row.pub_date,
                },
            );
            self.newest.truncate(NEWEST_LIMIT);
        }
    }

    pub fn finish(self) -> ArticleSummary {
        let average_word_count = (self.word_count_seen > 0)
            .then(|| self.word_count_sum as f64 / self.word_count_seen as f64);

        let mut categories: Vec<CategoryCount> = self
            .categories
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();

        // Largest desks first; unlabelled articles sort after every named desk with the same count.
        categories.sort_by(|a, b| {
            (Reverse(a.count), a.category.is_none(), &a.category)
                .cmp(&(Reverse(b.count), b.category.is_none(), &b.category))
        });

        ArticleSummary {
            total_articles: self.total,
            average_word_count,
            categories,
            newest: self.newest,
        }
    }
}
