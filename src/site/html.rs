use std::fmt::Write;

use super::trigger::OwnerTrigger;

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Only http(s), mailto, relative and fragment links survive; anything else becomes `#`.
pub fn safe_href(href: &str) -> String {
    let trimmed = href.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with('/')
        || lower.starts_with('#');
    if allowed {
        escape(trimmed)
    } else {
        "#".to_string()
    }
}

pub struct PageMeta<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub is_owner: bool,
}

pub fn layout(meta: &PageMeta<'_>, nav: &str, body: &str, footer: &str) -> String {
    let mut html = String::with_capacity(body.len() + 2048);
    let _ = write!(
        html,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <meta name=\"description\" content=\"{description}\">\n\
         </head>\n<body data-owner=\"{owner}\">\n",
        title = escape(meta.title),
        description = escape(meta.description),
        owner = meta.is_owner,
    );
    html.push_str(nav);
    html.push_str("<main>\n");
    html.push_str(body);
    html.push_str("</main>\n");
    html.push_str(footer);
    let _ = writeln!(
        html,
        "<div id=\"toasts\" aria-live=\"polite\"></div>\n\
         <script src=\"/assets/owner.js\" {trigger} defer></script>\n\
         </body>\n</html>",
        trigger = OwnerTrigger::default().data_attributes(),
    );
    html
}
