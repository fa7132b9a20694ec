//! Server-rendered home page.

use std::fmt::Write as _;

use shared::domain::FaqItem;

const HERO_TITLE: &str = "Validate emails with confidence ✨";
const HERO_DESCRIPTION: &str = "Simple, reliable email validation API for developers.";
pub const PAGE_SCRIPT_PATH: &str = "/static/js/main.js";
const PLUS_ICON: &str = r#"<path d="M12 5v14M5 12h14"></path>"#;

/// Hero, FAQ entries (collapsed) and the validation form.
pub fn render_home(faq_items: &[FaqItem], year: i32) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Email Validator</title>\n</head>\n<body>\n",
    );

    let _ = write!(
        html,
        "<section class=\"hero\">\n<h1>{}</h1>\n<p>{}</p>\n</section>\n",
        escape_html(HERO_TITLE),
        escape_html(HERO_DESCRIPTION),
    );

    html.push_str(
        "<section class=\"try-it\">\n\
         <form id=\"validateEmail\">\n\
         <input id=\"email\" name=\"email\" type=\"email\" placeholder=\"you@example.com\">\n\
         <button type=\"submit\">Validate</button>\n\
         </form>\n\
         <p id=\"result\"></p>\n\
         </section>\n",
    );

    html.push_str("<section class=\"faq\">\n");
    for item in faq_items {
        let _ = write!(
            html,
            "<div class=\"faq-item\">\n\
             <button type=\"button\" class=\"toggle-faq\"><span>{}</span>\
             <svg viewBox=\"0 0 24 24\" width=\"24\" height=\"24\">{PLUS_ICON}</svg></button>\n\
             <div class=\"faq-answer hidden\"><p>{}</p></div>\n\
             </div>\n",
            escape_html(&item.question),
            escape_html(&item.answer),
        );
    }
    html.push_str("</section>\n");

    let _ = write!(
        html,
        "<footer>&copy; {year} Email Validator</footer>\n\
         <script src=\"{PAGE_SCRIPT_PATH}\"></script>\n</body>\n</html>\n"
    );
    html
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
