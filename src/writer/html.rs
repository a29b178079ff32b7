//! Table renderer: a query result as a standalone, styled HTML page

use crate::reader::Value;
use std::fmt::Write;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css";
const TABLE_CLASSES: &str = "table table-bordered table-striped-columns table-hover text-center";

const STYLE: &str = "\
.table thead th{text-align:center;vertical-align:middle;background-color:#3c0069;color:white;}
body{background-color:#f8f9fa;}
.container{background-color:white;border-radius:10px;box-shadow:0 0 15px rgba(0,0,0,0.1);padding:25px;}
h2{color:#3c0069;font-weight:bold;}";

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render columns and rows as a complete HTML document
///
/// Rows keep their order. NULL cells render empty.
pub fn render(columns: &[String], rows: &[Vec<Value>], title: &str) -> String {
    let title = escape_html(title);
    let mut html = String::new();

    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"es\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "<meta charset=\"UTF-8\">");
    let _ = writeln!(html, "<title>{}</title>", title);
    let _ = writeln!(html, "<link href=\"{}\" rel=\"stylesheet\">", BOOTSTRAP_CSS);
    let _ = writeln!(html, "<style>\n{}\n</style>", STYLE);
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");
    let _ = writeln!(html, "<div class=\"container my-5\">");
    let _ = writeln!(html, "<h2 class=\"text-center mb-4\">{}</h2>", title);
    let _ = writeln!(html, "<div class=\"table-responsive\">");
    let _ = writeln!(html, "<table class=\"{}\">", TABLE_CLASSES);

    let _ = writeln!(html, "<thead>");
    let _ = write!(html, "<tr>");
    for column in columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    let _ = writeln!(html, "</tr>");
    let _ = writeln!(html, "</thead>");

    let _ = writeln!(html, "<tbody>");
    for row in rows {
        let _ = write!(html, "<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell.to_string()));
        }
        let _ = writeln!(html, "</tr>");
    }
    let _ = writeln!(html, "</tbody>");

    let _ = writeln!(html, "</table>");
    let _ = writeln!(html, "</div>");
    let _ = writeln!(html, "</div>");
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}
