/// Minimal HTML pages for the browser upload flow
use crate::radiation::GapFinding;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Solar radiation resampler</title>
</head>
<body>
<h1>Solar radiation resampler</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

fn upload_form(default_tolerance_hours: u32) -> String {
    format!(
        r#"<form method="post" action="/" enctype="multipart/form-data">
<p><input type="file" name="file" accept=".csv"></p>
<p>
<label><input type="radio" name="tool" value="interpolator" checked> Resample to 15 minutes</label>
<label><input type="radio" name="tool" value="gap_checker"> Check for gaps</label>
</p>
<p><label>Gap tolerance (hours) <input type="number" name="tolerance" min="0" value="{default_tolerance_hours}"></label></p>
<p><button type="submit">Upload</button></p>
</form>
"#
    )
}

/// Upload form, optionally with an error banner above it
pub fn index(default_tolerance_hours: u32, error: Option<&str>) -> String {
    let mut page = String::from(PAGE_HEAD);
    if let Some(message) = error {
        page.push_str(&format!(
            "<p class=\"error\" role=\"alert\">{}</p>\n",
            escape_html(message)
        ));
    }
    page.push_str(&upload_form(default_tolerance_hours));
    page.push_str(PAGE_TAIL);
    page
}

pub fn gap_report(findings: &[GapFinding], tolerance_hours: u32) -> String {
    let mut page = String::from(PAGE_HEAD);
    page.push_str(&format!(
        "<h2>Gap report (tolerance {tolerance_hours} hours)</h2>\n"
    ));

    if findings.is_empty() {
        page.push_str("<p>No station had enough observations to check.</p>\n");
    } else {
        page.push_str("<ul>\n");
        for finding in findings {
            page.push_str(&format!("<li>{}</li>\n", escape_html(&finding.to_string())));
        }
        page.push_str("</ul>\n");
    }

    page.push_str("<p><a href=\"/\">Check another file</a></p>\n");
    page.push_str(PAGE_TAIL);
    page
}

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
