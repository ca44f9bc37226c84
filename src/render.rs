//! Text rendering of the search view.
//!
//! Produces the form, the results table (or its empty state) and the
//! notification area as plain strings; the console decides where to print
//! them. Also supports JSON output for scripting.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Product;
use crate::notifications::{NoticeKind, Notifications};
use crate::search::SearchState;

/// Label used for product links when terminal hyperlinks are enabled
pub const LINK_LABEL: &str = "View on Amazon";

const HEADERS: [&str; 5] = ["Product Name", "Price", "Rating", "Reviews", "URL"];

/// Drops control characters so backend text cannot inject escape sequences.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Percent-encodes control characters in a URL so it can sit inside an
/// OSC 8 sequence without terminating it.
fn escape_url(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for c in url.chars() {
        if c.is_control() {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                escaped.push_str(&format!("%{byte:02X}"));
            }
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// A table cell: what is printed and how wide it looks on screen.
struct Cell {
    rendered: String,
    width: usize,
}

impl Cell {
    fn plain(text: &str) -> Self {
        let text = sanitize(text);
        Self {
            width: text.chars().count(),
            rendered: text,
        }
    }

    /// OSC 8 hyperlink; terminals that do not support it show the label.
    fn link(url: &str, label: &str) -> Self {
        let url = escape_url(url);
        Self {
            rendered: format!("\x1b]8;;{url}\x1b\\{label}\x1b]8;;\x1b\\"),
            width: label.chars().count(),
        }
    }

    fn padded(&self, width: usize) -> String {
        let fill = width.saturating_sub(self.width);
        format!("{}{}", self.rendered, " ".repeat(fill))
    }
}

fn product_row(product: &Product, hyperlinks: bool) -> [Cell; 5] {
    let link = if hyperlinks {
        Cell::link(&product.url, LINK_LABEL)
    } else {
        Cell::plain(&escape_url(&product.url))
    };

    [
        Cell::plain(&product.name),
        Cell::plain(&format!("${}", product.price)),
        Cell::plain(&product.rating),
        Cell::plain(&product.reviews),
        link,
    ]
}

/// Renders products as a table, in backend order.
pub fn format_table(products: &[Product], hyperlinks: bool) -> String {
    let rows: Vec<[Cell; 5]> = products
        .iter()
        .map(|p| product_row(p, hyperlinks))
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.width);
        }
    }

    let mut output = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| Cell::plain(h).padded(*w))
        .collect();
    output.push_str(header.join(" | ").trim_end());
    output.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join("-+-"));

    for row in &rows {
        output.push('\n');
        let cells: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| cell.padded(*w))
            .collect();
        output.push_str(cells.join(" | ").trim_end());
    }

    output
}

/// Results area: the table, or a hint when there is nothing to show yet.
pub fn format_results(products: &[Product], hyperlinks: bool) -> String {
    if products.is_empty() {
        "No products to show. Set a query and run `search`.".to_string()
    } else {
        format_table(products, hyperlinks)
    }
}

pub fn format_form(state: &SearchState) -> String {
    let disabled = if state.fields_enabled() {
        ""
    } else {
        " (disabled)"
    };
    let button = if state.is_loading() {
        "[ Searching... ]"
    } else {
        "[ Search ]"
    };

    format!(
        "Search Query: {:?}{disabled}\nPages: {}{disabled}\nTest Mode (Use Sample Products): {}\n{button}",
        state.query(),
        state.pages(),
        if state.test_mode() { "on" } else { "off" },
    )
}

pub fn format_notices(notices: &Notifications) -> Option<String> {
    let mut lines = Vec::new();
    for notice in notices.visible() {
        let message = sanitize(&notice.message);
        lines.push(match notice.kind {
            NoticeKind::Error => format!("[error] {message}  (dismiss error)"),
            NoticeKind::Success => format!("[success] {message}  (dismiss success)"),
        });
        if let Some(note) = &notice.note {
            lines.push(format!("          {}", sanitize(note)));
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// The whole view, top to bottom.
pub fn format_view(state: &SearchState, hyperlinks: bool) -> String {
    let mut sections = vec![
        "Amazon Product Scraper".to_string(),
        format_form(state),
        format_results(state.products(), hyperlinks),
    ];
    if let Some(notices) = format_notices(state.notices()) {
        sections.push(notices);
    }
    sections.join("\n\n")
}

/// JSON output structure for one-shot runs
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub query: &'a str,
    pub pages: u8,
    pub test_mode: bool,
    pub count: usize,
    pub products: &'a [Product],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
}

pub fn format_json(state: &SearchState) -> String {
    let output = JsonOutput {
        query: state.query(),
        pages: state.pages(),
        test_mode: state.test_mode(),
        count: state.products().len(),
        products: state.products(),
        success: Some(state.success()).filter(|s| !s.is_empty()),
        note: state.notices().success_note(),
        error: Some(state.error()).filter(|s| !s.is_empty()),
        scraped_at: state.scraped_at(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
