//! Email HTML rendering.
//!
//! Chapter text arrives as plain paragraphs separated by blank lines.
//! Attribution lines (leading em-dash or `--`) are styled separately so
//! quote collections read the way they do on the page. All chapter text
//! is escaped before it lands in markup.

use crate::store::DateKey;
use html_escape::encode_text;

/// Render the daily chapter email. Returns `(subject, html_body)`.
pub fn chapter_email(key: &DateKey, content: &str) -> (String, String) {
    let readable = key.readable();
    let subject = format!("Your Daily Reading - {readable}");

    let mut body = String::new();
    for para in content.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        if let Some(author) = attribution(para) {
            body.push_str(&format!(
                "<p class=\"author\">&mdash; {}</p>",
                encode_text(author)
            ));
        } else {
            body.push_str(&format!("<p class=\"quote\">{}</p>", encode_text(para)));
        }
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>
body {{ margin: 0; padding: 0; font-family: Georgia, 'Times New Roman', serif; background-color: #f5f5f0; }}
.container {{ max-width: 600px; margin: 20px auto; background-color: #ffffff; border-radius: 4px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }}
.header {{ background: linear-gradient(135deg, #8b7355 0%, #6b5344 100%); padding: 32px 40px; text-align: center; }}
.header h1 {{ margin: 0; color: #ffffff; font-size: 26px; font-weight: 400; letter-spacing: 0.5px; }}
.subheader {{ margin: 8px 0 0 0; color: #f5f5f0; font-size: 13px; letter-spacing: 1px; text-transform: uppercase; }}
.content {{ padding: 40px 40px 32px 40px; color: #2c2c2c; line-height: 1.8; }}
.quote {{ margin: 0 0 20px 0; font-size: 16px; }}
.author {{ margin: -8px 0 28px 0; font-size: 14px; color: #8b7355; font-style: italic; }}
.footer {{ padding: 24px 40px 32px 40px; background-color: #fafaf8; border-top: 1px solid #e8e8e0; text-align: center; }}
.footer p {{ margin: 0; font-size: 13px; color: #8b8b8b; font-style: italic; }}
</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>Your Daily Reading</h1>
<p class="subheader">{readable}</p>
</div>
<div class="content">
{body}
</div>
<div class="footer">
<p>A moment of reading to start your day</p>
</div>
</div>
</body>
</html>"#
    );

    (subject, html)
}

/// Render the fixed fallback notice for a date with no stored chapter.
pub fn fallback_email(key: &DateKey) -> (String, String) {
    let readable = key.readable();
    let subject = format!("Daily Reading - No Chapter Found for {key}");

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
body {{ font-family: Arial, sans-serif; padding: 20px; max-width: 600px; margin: 0 auto; }}
.warning {{ background-color: #fff3cd; border: 1px solid #ffc107; padding: 20px; border-radius: 5px; }}
h2 {{ color: #856404; }}
</style>
</head>
<body>
<div class="warning">
<h2>No Chapter Available</h2>
<p>No chapter was found for today's date: <strong>{readable}</strong> ({key}).</p>
<p>This could mean:</p>
<ul>
<li>The book has no reading for this date</li>
<li>The extraction missed this date</li>
<li>The store file is out of date</li>
</ul>
<p>Check the chapter store for an entry under "{key}".</p>
</div>
</body>
</html>"#
    );

    (subject, html)
}

/// Detect an attribution line and return the author text without its
/// leading dash markers.
fn attribution(para: &str) -> Option<&str> {
    if let Some(rest) = para.strip_prefix('\u{2014}') {
        return Some(rest.trim_start_matches(['\u{2014}', '-', ' ']));
    }
    if let Some(rest) = para.strip_prefix("--") {
        return Some(rest.trim_start_matches(['-', ' ']));
    }
    None
}
