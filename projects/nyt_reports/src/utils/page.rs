use crate::utils::summary::ArticleSummary;

pub const SEARCH_PATH: &str = "/articles/search";

const UNCATEGORIZED: &str = "Uncategorized";

// Replaces the children of #search-results on every input change. Responses
// that arrive after a newer request was sent are dropped.
const SEARCH_SCRIPT: &str = r#"
const input = document.getElementById('search-input');
const results = document.getElementById('search-results');
let latest = 0;
input.addEventListener('input', async () => {
    const ticket = ++latest;
    const response = await fetch(SEARCH_PATH + '?q=' + encodeURIComponent(input.value));
    if (!response.ok || ticket !== latest) {
        return;
    }
    const links = await response.json();
    if (ticket !== latest) {
        return;
    }
    results.replaceChildren(...links.map((link) => {
        const item = document.createElement('li');
        const anchor = document.createElement('a');
        anchor.href = link.web_url;
        anchor.textContent = link.headline;
        item.appendChild(anchor);
        return item;
    }));
});
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{value:.2}"),
        None => "n/a".to_string(),
    }
}

/// Full dashboard page for one summary. The search list starts empty.
pub fn render_dashboard(summary: &ArticleSummary) -> String {
    let mut categories = String::new();
    for entry in &summary.categories {
        let label = entry.category.as_deref().unwrap_or(UNCATEGORIZED);
        categories.push_str(&format!(
            "      <li>{}: {} articles</li>\n",
            escape_html(label),
            entry.count
        ));
    }

    let mut newest = String::new();
    for article in &summary.newest {
        newest.push_str(&format!(
            "      <li style=\"list-style-type: none\"><a href=\"{}\">{}</a></li>\n",
            escape_html(&article.web_url),
            escape_html(&article.headline)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>NY Times Article Statistics</title>
  </head>
  <body>
    <h1>NY Times Article Statistics</h1>
    <div style="margin-bottom: 20px">Total articles: {total}</div>
    <div style="margin-bottom: 20px">The average word count is: {average}</div>

    <h2>Article Search</h2>
    <input id="search-input" type="text" placeholder="Enter keywords...">
    <ul id="search-results"></ul>

    <h2>Articles per Section:</h2>
    <ul>
{categories}    </ul>

    <h2>5 Latest Articles:</h2>
    <ul>
{newest}    </ul>

    <script>
const SEARCH_PATH = "{search_path}";
{script}
    </script>
  </body>
</html>
"#,
        total = summary.total_articles,
        average = format_average(summary.average_word_count),
        categories = categories,
        newest = newest,
        search_path = SEARCH_PATH,
        script = SEARCH_SCRIPT,
    )
}
