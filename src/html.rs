//! Static HTML output for a built [`Dashboard`].
//!
//! The page is self-contained: tables carry their full cell text in
//! `data-fulltext`, charts are `<canvas>` elements, and the chart counts are
//! embedded as JSON for whichever charting script the page is served with.

use std::fmt::Write as _;

use anyhow::Result;

use crate::{
    dashboard::{ChartData, Dashboard, SlotContent},
    prefs::Preferences,
    table::TableView,
};

const STYLE: &str = r#"
body { font-family: Tahoma, sans-serif; margin: 0; padding: 1rem; }
body.dark-mode { background: #1e1e1e; color: #eee; --heading-bg: #333; --heading-text: #fff; }
body.light-mode { background: #fafafa; color: #222; --heading-bg: #e0e0e0; --heading-text: #222; }
section { margin-bottom: 1.5rem; }
table { border-collapse: collapse; width: 100%; }
th { background: var(--heading-bg); color: var(--heading-text); }
th, td { border: 1px solid #ddd; padding: 4px; }
tr.highlight-red { background: rgba(244, 67, 54, 0.25); }
tr.highlight-yellow { background: rgba(255, 235, 59, 0.35); }
.load-error { color: #d32f2f; }
"#;

pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_page(dashboard: &Dashboard, prefs: &Preferences) -> Result<String> {
    let mut body = String::new();
    for slot in dashboard.page.slots() {
        let _ = writeln!(body, "<section id=\"{}-section\">", escape(&slot.id));
        match &slot.content {
            Some(content) => body.push_str(&render_content(&slot.id, content)),
            None => {
                let _ = writeln!(body, "<div id=\"{}\"></div>", escape(&slot.id));
            }
        }
        body.push_str("</section>\n");
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="fa" dir="rtl">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{style}</style>
</head>
<body class="{theme}" style="font-size: {font_scale}em">
<h1>{title}</h1>
{body}<script type="application/json" id="chart-data">{charts}</script>
</body>
</html>
"#,
        title = escape(&dashboard.title),
        style = STYLE,
        theme = prefs.theme.css_class(),
        font_scale = prefs.font_scale,
        body = body,
        charts = chart_json(&dashboard.charts)?.replace("</", "<\\/"),
    ))
}

pub fn chart_json(charts: &[ChartData]) -> Result<String> {
    Ok(serde_json::to_string(charts)?)
}

fn render_content(id: &str, content: &SlotContent) -> String {
    let id = escape(id);
    match content {
        SlotContent::Table { title, view } => {
            let mut out = String::new();
            if let Some(title) = title {
                let _ = writeln!(out, "<h2>{}</h2>", escape(title));
            }
            out.push_str(&render_table(&id, view));
            out
        }
        SlotContent::Ticker { rows } => {
            let mut out = format!("<ul id=\"{id}\" class=\"rd-info\">\n");
            for row in rows {
                let _ = writeln!(out, "<li class=\"rd-row\">{}</li>", escape(row));
            }
            out.push_str("</ul>\n");
            out
        }
        SlotContent::Chart(chart) => render_chart(&id, chart),
        SlotContent::Error { message } => {
            format!(
                "<div id=\"{id}\"><p class=\"load-error\">{}</p></div>\n",
                escape(message)
            )
        }
    }
}

fn render_table(id: &str, view: &TableView) -> String {
    let mut out = format!("<table id=\"{id}\">\n<thead><tr>");
    for header in &view.headers {
        let _ = write!(out, "<th>{}</th>", escape(header));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &view.rows {
        match row.due.css_class() {
            Some(class) => {
                let _ = write!(out, "<tr class=\"{class}\">");
            }
            None => out.push_str("<tr>"),
        }
        for cell in &row.cells {
            let _ = write!(
                out,
                "<td data-fulltext=\"{}\">{}</td>",
                escape(&cell.full_text),
                escape(&cell.display)
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn render_chart(id: &str, chart: &ChartData) -> String {
    let mut out = String::new();
    if let Some(title) = &chart.title {
        let _ = writeln!(out, "<h2>{}</h2>", escape(title));
    }
    let _ = writeln!(
        out,
        "<canvas id=\"{id}\" data-chart=\"{}\"></canvas>",
        escape(&chart.id)
    );
    if !chart.unclassified.is_empty() {
        let _ = writeln!(
            out,
            "<ul class=\"unclassified\" data-chart=\"{}\">",
            escape(&chart.id)
        );
        for value in &chart.unclassified {
            let _ = writeln!(out, "<li>{}</li>", escape(value));
        }
        out.push_str("</ul>\n");
    }
    out
}
