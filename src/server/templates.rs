//! HTML templates for the web interface.

use chrono::{DateTime, Utc};

use crate::models::{Column, PatentRecord};
use crate::scrapers::PortalVersions;
use crate::search::{Filter, GLOBAL_PARAM};

/// Columns offered in the filter form, in layout order.
const FORM_COLUMNS: [Column; 6] = [
    Column::ApplicationNumber,
    Column::Title,
    Column::ApplicationType,
    Column::AgentName,
    Column::PriorityCountry,
    Column::Classification,
];

/// Columns shown in the results table. Abstract lives in the detail panels.
const TABLE_COLUMNS: [Column; 7] = [
    Column::ApplicationNumber,
    Column::Title,
    Column::AgentName,
    Column::ApplicationDate,
    Column::Classification,
    Column::PriorityCountry,
    Column::ApplicationType,
];

/// Base HTML page.
pub fn base_template(title: &str, content: &str, has_logo: bool, signed_in: bool) -> String {
    let brand = if has_logo {
        r#"<img src="/logo" alt="Patent Discovery Portal" class="logo-img">"#.to_string()
    } else {
        r#"<span class="logo">Patent Discovery Portal</span>"#.to_string()
    };
    let nav = if signed_in {
        r#"<form method="post" action="/logout" class="inline"><button class="btn-small">sign out</button></form>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Patent Discovery Portal</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header id="main-header">
        <nav>
            <a href="/">{}</a>
            {}
        </nav>
    </header>
    <main>
        <h1>{}</h1>
        {}
    </main>
</body>
</html>"#,
        html_escape(title),
        brand,
        nav,
        html_escape(title),
        content
    )
}

/// Passcode form.
pub fn login_form(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="banner error">{}</p>"#, html_escape(e)))
        .unwrap_or_default();

    format!(
        r#"
    <form method="post" action="/login" class="login">
        <h2>Internal Search Portal</h2>
        {}
        <label for="passcode">Security Passcode</label>
        <input type="password" id="passcode" name="passcode" autofocus>
        <button type="submit">Unlock access</button>
    </form>
    "#,
        error
    )
}

/// Filter form, pre-filled with the active queries.
pub fn search_form(filter: &Filter) -> String {
    let mut fields = String::new();
    for column in FORM_COLUMNS {
        fields.push_str(&format!(
            r#"
            <label>{}<input type="text" name="{}" value="{}"></label>"#,
            column.label(),
            column.param(),
            html_escape(filter.column(column).unwrap_or(""))
        ));
    }

    format!(
        r#"
    <form method="get" action="/" class="search">
        <h3>Search Filters</h3>
        <label class="wide">Any field<input type="text" name="{}" value="{}"></label>
        <div class="filter-grid">{}
        </div>
        <button type="submit">Search</button>
        <a href="/" class="btn-small">clear</a>
    </form>
    "#,
        GLOBAL_PARAM,
        html_escape(filter.global().unwrap_or("")),
        fields
    )
}

/// Dataset source line with reload and probe controls.
pub fn dataset_status(
    source: &str,
    record_count: Option<usize>,
    loaded_at: Option<DateTime<Utc>>,
    scrape_enabled: bool,
) -> String {
    let detail = match (record_count, loaded_at) {
        (Some(count), Some(at)) => format!(
            "{} records, loaded {}",
            count,
            at.format("%Y-%m-%d %H:%M UTC")
        ),
        _ => "not loaded".to_string(),
    };
    let scrape = if scrape_enabled {
        r#"<form method="post" action="/scrape" class="inline"><button class="btn-small">check portal version</button></form>"#
    } else {
        ""
    };

    format!(
        r#"
    <aside class="status">
        <span>Database: {} ({})</span>
        <form method="post" action="/reload" class="inline"><button class="btn-small">reload</button></form>
        {}
    </aside>
    "#,
        html_escape(source),
        detail,
        scrape
    )
}

/// Match count, export links, results table and detail panels.
///
/// At most `display_limit` records are rendered; the count and exports always
/// cover the full match set.
pub fn results(records: &[&PatentRecord], filter: &Filter, display_limit: usize) -> String {
    let shown = &records[..records.len().min(display_limit)];
    let query = query_string(filter);

    let truncated = if shown.len() < records.len() {
        format!(
            r#"<p class="muted">Showing the first {} of {} matches. Export to see all.</p>"#,
            shown.len(),
            records.len()
        )
    } else {
        String::new()
    };

    let mut head = String::new();
    for column in TABLE_COLUMNS {
        head.push_str(&format!("<th>{}</th>", column.header()));
    }

    let mut rows = String::new();
    for record in shown {
        rows.push_str("\n            <tr>");
        for column in TABLE_COLUMNS {
            rows.push_str(&format!("<td>{}</td>", html_escape(record.get(column))));
        }
        rows.push_str("</tr>");
    }

    let mut details = String::new();
    for record in shown {
        details.push_str(&record_detail(record));
    }

    format!(
        r#"
    <h4 class="count">Matches Found: {}</h4>
    <p class="exports">
        <a href="/export.xlsx{}" class="btn-small">download .xlsx</a>
        <a href="/export.csv{}" class="btn-small">download .csv</a>
    </p>
    {}
    <table class="file-listing">
        <thead>
            <tr>{}</tr>
        </thead>
        <tbody>{}
        </tbody>
    </table>
    <section class="details">{}
    </section>
    "#,
        records.len(),
        query,
        query,
        truncated,
        head,
        rows,
        details
    )
}

/// Expandable panel with the abstract and priority details of one record.
pub fn record_detail(record: &PatentRecord) -> String {
    format!(
        r#"
        <details>
            <summary>{} | {}</summary>
            <p><strong>Abstract:</strong> {}</p>
            <p class="accent">Priority Number: {}</p>
            <p class="muted">Priority Date: {} &middot; Application Date: {}</p>
        </details>"#,
        html_escape(&record.application_number),
        html_escape(&record.title),
        html_escape(&record.abstract_text),
        html_escape(&record.priority_number),
        html_escape(&record.priority_date),
        html_escape(&record.application_date)
    )
}

/// Outcome of a portal version probe.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub fn scrape_result(result: Result<&PortalVersions, &str>, fields: &[String; 2]) -> String {
    let body = match result {
        Ok(versions) => format!(
            r#"
        <dl>
            <dt>{}</dt><dd>{}</dd>
            <dt>{}</dt><dd>{}</dd>
        </dl>"#,
            html_escape(&fields[0]),
            html_escape(&versions.first),
            html_escape(&fields[1]),
            html_escape(&versions.second)
        ),
        Err(message) => error_banner(message),
    };

    format!(
        r#"
    <section class="scrape">{}
        <p><a href="/">back to search</a></p>
    </section>
    "#,
        body
    )
}

pub fn warning_banner(message: &str) -> String {
    format!(r#"<p class="banner warning">{}</p>"#, html_escape(message))
}

pub fn error_banner(message: &str) -> String {
    format!(r#"<p class="banner error">{}</p>"#, html_escape(message))
}

/// `?key=value&...` for the active filters, or empty.
fn query_string(filter: &Filter) -> String {
    let params = filter.to_params();
    if params.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    html_escape(&format!("?{}", pairs.join("&")))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// CSS styles for the web interface - minimal text-based design.
pub const CSS: &str = r#"
:root {
    --bg: #fff;
    --text: #222;
    --text-muted: #666;
    --link: #0066cc;
    --accent: #c65d00;
    --border: #ccc;
    --warn-bg: #fff6e0;
    --error-bg: #fdecea;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    margin: 0;
    line-height: 1.5;
}

#main-header {
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
}

#main-header nav {
    display: flex;
    justify-content: space-between;
    align-items: center;
}

.logo { font-weight: bold; color: var(--accent); }
.logo-img { max-height: 48px; }

main { padding: 1rem; max-width: 1400px; margin: 0 auto; }

a { color: var(--link); }

.inline { display: inline; }

.btn-small {
    font-size: 0.85rem;
    padding: 0.15rem 0.5rem;
    border: 1px solid var(--border);
    background: none;
    cursor: pointer;
    text-decoration: none;
}

.login {
    max-width: 420px;
    margin: 3rem auto;
    padding: 2rem;
    border: 1px solid var(--border);
    display: flex;
    flex-direction: column;
    gap: 0.5rem;
}

.filter-grid {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 0.5rem 1rem;
    margin: 0.5rem 0;
}

.search label { display: flex; flex-direction: column; font-size: 0.9rem; }
.search label.wide { max-width: 100%; }

.status { color: var(--text-muted); margin: 0.5rem 0 1rem; }

.count { color: var(--accent); }
.accent { color: var(--accent); }
.muted { color: var(--text-muted); }

.banner { padding: 0.5rem 1rem; border: 1px solid var(--border); }
.banner.warning { background: var(--warn-bg); }
.banner.error { background: var(--error-bg); }

.file-listing {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.9rem;
}

.file-listing th, .file-listing td {
    text-align: left;
    padding: 0.25rem 0.5rem;
    border-bottom: 1px solid var(--border);
}

.details details {
    border: 1px solid var(--border);
    margin: 0.25rem 0;
    padding: 0.25rem 0.5rem;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(app: &str, title: &str) -> PatentRecord {
        PatentRecord {
            application_number: app.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_results_escape_and_cap() {
        let records = vec![
            record("US1", "<script>x</script>"),
            record("US2", "Gadget"),
            record("US3", "Gizmo"),
        ];
        let refs: Vec<&PatentRecord> = records.iter().collect();
        let html = results(&refs, &Filter::new(), 2);

        assert!(html.contains("Matches Found: 3"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Showing the first 2 of 3"));
        assert!(!html.contains("Gizmo"));
    }

    #[test]
    fn test_export_links_carry_filters() {
        let filter = Filter::new()
            .with_column(Column::Title, "a&b")
            .with_global("x y");
        let html = results(&[], &filter, 50);
        assert!(html.contains("/export.xlsx?title=a%26b&amp;q=x%20y"));
    }

    #[test]
    fn test_search_form_prefills_queries() {
        let filter = Filter::new().with_column(Column::AgentName, "\"Smith\"");
        let html = search_form(&filter);
        assert!(html.contains(r#"name="agent_name" value="&quot;Smith&quot;""#));
    }
}
