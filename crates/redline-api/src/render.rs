//! Minimal HTML rendering for the browser-facing routes. The service keeps
//! no template assets; the pages are small enough to assemble directly.

use std::fmt::Write;

use redline_db::models::SortOrder;
use redline_types::models::Feedback;

const STYLE: &str = "\
    body { font-family: sans-serif; margin: 2em; } \
    table { border-collapse: collapse; } \
    td, th { border: 1px solid #999; padding: 0.3em 0.6em; } \
    tr.edited { background: #fff3bf; } \
    label { display: block; margin-top: 0.5em; }";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{}</h1>\n{}\n</body>\n</html>\n",
        escape(title),
        escape(title),
        body
    )
}

pub fn feedback_list(
    items: &[Feedback],
    current_page: u32,
    total_pages: u64,
    section_filter: &str,
    sort: SortOrder,
    edited_feedback_id: Option<i64>,
) -> String {
    let mut body = String::new();

    // Filter and sort controls round-trip through query parameters.
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/feedback/\">\
         <input type=\"text\" name=\"related_section\" value=\"{}\" placeholder=\"Related section\">\
         <select name=\"sort\">\
         <option value=\"asc\"{}>Oldest first</option>\
         <option value=\"desc\"{}>Newest first</option>\
         </select>\
         <button type=\"submit\">Filter</button>\
         </form>\n",
        escape(section_filter),
        if sort == SortOrder::Asc { " selected" } else { "" },
        if sort == SortOrder::Desc { " selected" } else { "" },
    );

    if items.is_empty() {
        body.push_str("<p>No feedback comments to show.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Category</th><th>Description</th><th>Section</th>\
             <th>Resolved</th><th>Priority</th><th>Assigned to</th>\
             <th>Created</th><th></th></tr>\n",
        );
        for feedback in items {
            let row_class = if edited_feedback_id == Some(feedback.id) {
                " class=\"edited\""
            } else {
                ""
            };
            let _ = write!(
                body,
                "<tr{row_class}><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{}</td><td>{}</td>\
                 <td><a href=\"/feedback/edit/{}?page={current_page}\">Edit</a> \
                 <form method=\"post\" action=\"/feedback/delete/{}\" style=\"display:inline\">\
                 <button type=\"submit\">Delete</button></form></td></tr>\n",
                escape(&feedback.category),
                escape(&feedback.description),
                escape(feedback.related_section.as_deref().unwrap_or("")),
                escape(&feedback.resolved_status),
                escape(feedback.priority_level.as_deref().unwrap_or("")),
                escape(feedback.assigned_to.as_deref().unwrap_or("")),
                feedback.created_date.format("%d/%m/%Y"),
                feedback.id,
                feedback.id,
            );
        }
        body.push_str("</table>\n");
    }

    // Pagination keeps the active filter and sort.
    body.push_str("<p>");
    if current_page > 1 {
        let _ = write!(
            body,
            "<a href=\"/feedback/?related_section={}&sort={}&page={}\">Previous</a> ",
            encode_query(section_filter),
            sort.as_str(),
            current_page - 1,
        );
    }
    let _ = write!(body, "Page {current_page} of {}", total_pages.max(1));
    if u64::from(current_page) < total_pages {
        let _ = write!(
            body,
            " <a href=\"/feedback/?related_section={}&sort={}&page={}\">Next</a>",
            encode_query(section_filter),
            sort.as_str(),
            current_page + 1,
        );
    }
    body.push_str("</p>\n");

    body.push_str(
        "<p><a href=\"/feedback/add\">Add a comment</a> | \
         <a href=\"/feedback/counts\">Section counts</a></p>\n",
    );

    page("Feedback comments", &body)
}

pub fn add_feedback_form() -> String {
    let body = format!(
        "<form method=\"post\" action=\"/feedback/add\">\n{}\
         <button type=\"submit\">Add comment</button>\n</form>\n",
        form_fields(None)
    );
    page("Add feedback", &body)
}

pub fn edit_feedback_form(feedback: &Feedback, current_page: u32) -> String {
    let body = format!(
        "<form method=\"post\" action=\"/feedback/edit/{}?page={current_page}\">\n{}\
         <button type=\"submit\">Save changes</button>\n</form>\n",
        feedback.id,
        form_fields(Some(feedback))
    );
    page("Edit feedback", &body)
}

pub fn section_counts(appendix: u64, r#abstract: u64, executive_summary: u64) -> String {
    let body = format!(
        "<table>\n<tr><th>Section</th><th>Comments</th></tr>\n\
         <tr><td>Appendix</td><td>{}</td></tr>\n\
         <tr><td>Abstract</td><td>{}</td></tr>\n\
         <tr><td>Executive Summary</td><td>{}</td></tr>\n</table>\n\
         <p><a href=\"/feedback/\">Back to comments</a></p>\n",
        appendix, r#abstract, executive_summary,
    );
    page("Feedback counts per section", &body)
}

fn form_fields(existing: Option<&Feedback>) -> String {
    let value = |get: fn(&Feedback) -> &str| existing.map(get).map(escape).unwrap_or_default();

    format!(
        "<label>Category <input type=\"text\" name=\"category\" value=\"{}\"></label>\n\
         <label>Description <textarea name=\"description\">{}</textarea></label>\n\
         <label>Resolved status <input type=\"text\" name=\"resolved_status\" value=\"{}\"></label>\n\
         <label>Priority level <input type=\"text\" name=\"priority_level\" value=\"{}\"></label>\n\
         <label>Related section <input type=\"text\" name=\"related_section\" value=\"{}\"></label>\n\
         <label>Assigned to <input type=\"text\" name=\"assigned_to\" value=\"{}\"></label>\n",
        value(|f| &f.category),
        value(|f| &f.description),
        value(|f| &f.resolved_status),
        value(|f| f.priority_level.as_deref().unwrap_or("")),
        value(|f| f.related_section.as_deref().unwrap_or("")),
        value(|f| f.assigned_to.as_deref().unwrap_or("")),
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn encode_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}
