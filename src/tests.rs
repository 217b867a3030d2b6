use crate::config::{MailArgs, MailConfig};
use crate::extract::{self, ExtractMode, date, epub::EpubArchive, html};
use crate::mailer::{Address, Party, SendEmailRequest};
use crate::store::{ChapterStore, DateKey};
use crate::template;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn key(s: &str) -> DateKey {
    s.parse().unwrap()
}

/// Build a minimal EPUB in memory: container.xml, an OPF under OEBPS/,
/// and the given (href, markup) documents in spine order.
fn make_epub(docs: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();

    zip.start_file("META-INF/container.xml", opts).unwrap();
    zip.write_all(
        br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
    )
    .unwrap();

    let mut manifest = String::new();
    let mut spine = String::new();
    for (i, (href, _)) in docs.iter().enumerate() {
        manifest.push_str(&format!(
            r#"<item id="doc{i}" href="{href}" media-type="application/xhtml+xml"/>"#
        ));
        spine.push_str(&format!(r#"<itemref idref="doc{i}"/>"#));
    }
    let opf = format!(
        r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata/>
  <manifest>{manifest}</manifest>
  <spine>{spine}</spine>
</package>"#
    );
    zip.start_file("OEBPS/content.opf", opts).unwrap();
    zip.write_all(opf.as_bytes()).unwrap();

    for (href, markup) in docs {
        zip.start_file(format!("OEBPS/{href}"), opts).unwrap();
        zip.write_all(markup.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

fn chapter_doc(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{title}</title></head>
<body><h1>{title}</h1>{body}</body>
</html>"#
    )
}

fn extract_from_docs(
    docs: &[(&str, &str)],
    mode: ExtractMode,
) -> (ChapterStore, extract::ExtractSummary) {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), make_epub(docs)).unwrap();
    extract::extract_chapters(file.path(), mode).unwrap()
}

#[test]
fn date_key_parse_and_display() {
    assert_eq!(key("01-01").to_string(), "01-01");
    assert_eq!(key("12-31").to_string(), "12-31");
    assert_eq!(key("1-9").to_string(), "01-09");

    assert!("13-01".parse::<DateKey>().is_err());
    assert!("00-10".parse::<DateKey>().is_err());
    assert!("02-30".parse::<DateKey>().is_err());
    assert!("04-31".parse::<DateKey>().is_err());
    assert!("0101".parse::<DateKey>().is_err());
    assert!("ab-cd".parse::<DateKey>().is_err());
    assert!("".parse::<DateKey>().is_err());
}

#[test]
fn date_key_leap_day_is_valid() {
    let leap = key("02-29");
    assert_eq!(leap.month(), 2);
    assert_eq!(leap.day(), 29);
    assert_eq!(leap.readable(), "February 29");
}

#[test]
fn date_key_ordering_is_chronological() {
    assert!(key("01-02") < key("01-10"));
    assert!(key("01-31") < key("02-01"));
    assert!(key("09-30") < key("10-01"));
}

#[test]
fn date_key_from_day_of_year() {
    assert_eq!(DateKey::from_day_of_year(1), Some(key("01-01")));
    assert_eq!(DateKey::from_day_of_year(60), Some(key("02-29")));
    assert_eq!(DateKey::from_day_of_year(366), Some(key("12-31")));
    assert_eq!(DateKey::from_day_of_year(0), None);
    assert_eq!(DateKey::from_day_of_year(367), None);
}

#[test]
fn date_from_title_month_day() {
    assert_eq!(date::date_from_title("January 1"), Some(key("01-01")));
    assert_eq!(date::date_from_title("Jan 15"), Some(key("01-15")));
    assert_eq!(date::date_from_title("JULY 4"), Some(key("07-04")));
    assert_eq!(
        date::date_from_title("Chapter 12: December 25"),
        Some(key("12-25"))
    );
}

#[test]
fn date_from_title_day_month() {
    assert_eq!(date::date_from_title("1 January"), Some(key("01-01")));
    assert_eq!(date::date_from_title("1st January"), Some(key("01-01")));
    assert_eq!(date::date_from_title("2nd Feb"), Some(key("02-02")));
    assert_eq!(date::date_from_title("21 May"), Some(key("05-21")));
}

#[test]
fn date_from_title_day_number() {
    assert_eq!(date::date_from_title("Day 1"), Some(key("01-01")));
    assert_eq!(date::date_from_title("Day 60"), Some(key("02-29")));
    assert_eq!(date::date_from_title("Day 366"), Some(key("12-31")));
    assert_eq!(date::date_from_title("Day 367"), None);
    assert_eq!(date::date_from_title("Day 0"), None);
}

#[test]
fn date_from_title_rejects_undated_and_impossible() {
    assert_eq!(date::date_from_title("Contents"), None);
    assert_eq!(date::date_from_title("Introduction"), None);
    assert_eq!(date::date_from_title("February 30"), None);
    assert_eq!(date::date_from_title(""), None);
}

#[test]
fn inline_split_finds_entries() {
    let text = "January 1\n\nFirst entry text here.\n\n— Tolstoy\n\nJanuary 2\n\nSecond entry text here.";
    let entries = date::split_inline_entries(text);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, key("01-01"));
    assert_eq!(entries[0].1, "First entry text here.\n\n— Tolstoy");
    assert_eq!(entries[1].0, key("01-02"));
    assert_eq!(entries[1].1, "Second entry text here.");
}

#[test]
fn inline_split_ignores_dates_inside_prose() {
    let text = "Preface\n\nWe met on January 1 and parted ways.\n\nNothing else.";
    assert!(date::split_inline_entries(text).is_empty());
}

#[test]
fn html_to_text_preserves_paragraphs() {
    let markup = chapter_doc("January 1", &["First paragraph.", "Second  paragraph\n here."]);
    let text = html::html_to_text(&markup);
    assert_eq!(
        text,
        "January 1\n\nFirst paragraph.\n\nSecond paragraph here."
    );
}

#[test]
fn html_to_text_drops_script_and_style() {
    let markup = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body>
<script>var x = 1;</script><style>p { color: red; }</style>
<p>Visible text.</p></body></html>"#;
    assert_eq!(html::html_to_text(markup), "Visible text.");
}

#[test]
fn html_to_text_falls_back_on_malformed_markup() {
    // Unclosed tag and a bare entity: not well-formed XML.
    let markup = "<html><body><p>Tea&nbsp;&amp; books<br>next line<p>more text</body></html>";
    let text = html::html_to_text(markup);
    // &nbsp; decodes to U+00A0, which whitespace normalization folds away.
    assert!(text.contains("Tea & books"));
    assert!(text.contains("next line"));
    assert!(text.contains("more text"));
}

#[test]
fn first_heading_prefers_h1() {
    let markup = chapter_doc("March 5", &["Body."]);
    assert_eq!(html::first_heading(&markup), Some("March 5".to_string()));

    let malformed = "<html><head><title>April 2</title></head><body><p>x&nbsp;y</body></html>";
    assert_eq!(html::first_heading(malformed), Some("April 2".to_string()));

    let no_heading = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><p>Text.</p></body></html>"#;
    assert_eq!(html::first_heading(no_heading), None);
}

#[test]
fn store_round_trip_preserves_content() {
    let file = tempfile::NamedTempFile::new().unwrap();

    let mut store = ChapterStore::new();
    let content = "A first paragraph.\n\n— An Author\n\nA second paragraph.";
    store.insert(key("01-01"), content.to_string());
    store.insert(key("02-29"), "Leap day reading.".to_string());
    store.save(file.path()).unwrap();

    let loaded = ChapterStore::load(file.path()).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get(&key("01-01")), Some(content));
    assert_eq!(loaded.get(&key("02-29")), Some("Leap day reading."));
}

#[test]
fn store_load_rejects_bad_keys() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), r#"{"02-30": "impossible"}"#).unwrap();
    assert!(ChapterStore::load(file.path()).is_err());
}

#[test]
fn store_lookup_hit_and_miss() {
    let mut store = ChapterStore::new();
    store.insert(key("01-01"), "Hello".to_string());

    // Simulated 2024-01-01: the stored entry is selected.
    assert_eq!(store.get(&key("01-01")), Some("Hello"));
    // Simulated 2024-01-02: lookup misses, the caller takes the fallback path.
    assert_eq!(store.get(&key("01-02")), None);
}

#[test]
fn store_missing_dates_cover_leap_calendar() {
    let store = ChapterStore::new();
    assert_eq!(store.missing_dates().len(), 366);

    let mut store = ChapterStore::new();
    for day in 1..=366 {
        let k = DateKey::from_day_of_year(day).unwrap();
        store.insert(k, format!("Entry {day} with enough text."));
    }
    assert!(store.missing_dates().is_empty());
    assert_eq!(store.len(), 366);
    assert_eq!(
        store.date_range(),
        Some((key("01-01"), key("12-31")))
    );
}

#[test]
fn store_missing_dates_reports_leap_day() {
    let mut store = ChapterStore::new();
    for day in 1..=366 {
        let k = DateKey::from_day_of_year(day).unwrap();
        if k != key("02-29") {
            store.insert(k, "text".to_string());
        }
    }
    assert_eq!(store.missing_dates(), vec![key("02-29")]);
}

#[test]
fn extract_title_mode_keys_by_heading() {
    let docs = [
        ("toc.xhtml", chapter_doc("Contents", &["A list of chapters follows."])),
        (
            "ch1.xhtml",
            chapter_doc("January 1", &["The first reading of the year."]),
        ),
        (
            "ch2.xhtml",
            chapter_doc("January 2", &["The second reading of the year."]),
        ),
    ];
    let docs: Vec<(&str, &str)> = docs.iter().map(|(h, m)| (*h, m.as_str())).collect();
    let (store, summary) = extract_from_docs(&docs, ExtractMode::Title);

    assert_eq!(summary.documents, 3);
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.skipped, vec!["Contents (no date found)".to_string()]);
    assert_eq!(store.len(), 2);
    assert_eq!(
        store.get(&key("01-01")),
        Some("January 1\n\nThe first reading of the year.")
    );
}

#[test]
fn extract_auto_mode_splits_inline_calendar() {
    let body = r#"<?xml version="1.0"?>
<html xmlns="http://www.w3.org/1999/xhtml"><body>
<p>January 1</p>
<p>Wisdom for the first day of the year.</p>
<p>— Tolstoy</p>
<p>January 2</p>
<p>Wisdom for the second day of the year.</p>
<p>January 3</p>
<p>Wisdom for the third day of the year.</p>
</body></html>"#;
    let (store, summary) = extract_from_docs(&[("calendar.xhtml", body)], ExtractMode::Auto);

    assert_eq!(summary.extracted, 3);
    assert!(summary.skipped.is_empty());
    assert_eq!(
        store.get(&key("01-01")),
        Some("Wisdom for the first day of the year.\n\n— Tolstoy")
    );
    assert_eq!(
        store.get(&key("01-03")),
        Some("Wisdom for the third day of the year.")
    );
}

#[test]
fn extract_auto_mode_uses_title_for_single_entry_docs() {
    let doc = chapter_doc("June 15", &["A reading for the middle of June."]);
    let (store, summary) = extract_from_docs(&[("ch.xhtml", doc.as_str())], ExtractMode::Auto);

    assert_eq!(summary.extracted, 1);
    assert!(store.get(&key("06-15")).is_some());
}

#[test]
fn extract_skips_short_entries() {
    let doc = chapter_doc("July 1", &[]);
    let (store, summary) = extract_from_docs(&[("ch.xhtml", doc.as_str())], ExtractMode::Title);

    // "July 1" alone is under the noise threshold.
    assert!(store.is_empty());
    assert_eq!(summary.skipped, vec!["July 1 (empty content)".to_string()]);
}

#[test]
fn epub_archive_lists_spine_documents_in_order() {
    let docs = [
        ("b.xhtml", chapter_doc("January 2", &["Second."])),
        ("a.xhtml", chapter_doc("January 1", &["First."])),
    ];
    let docs: Vec<(&str, &str)> = docs.iter().map(|(h, m)| (*h, m.as_str())).collect();

    let mut archive = EpubArchive::from_reader(Cursor::new(make_epub(&docs))).unwrap();
    let items: Vec<String> = archive.documents().iter().map(|d| d.path.clone()).collect();
    assert_eq!(items, vec!["OEBPS/b.xhtml", "OEBPS/a.xhtml"]);

    let item = archive.documents()[0].clone();
    let markup = archive.read_document(&item).unwrap();
    assert!(markup.contains("January 2"));
}

#[test]
fn chapter_email_escapes_and_styles_attributions() {
    let (subject, html) =
        template::chapter_email(&key("01-01"), "A thought with <b>markup</b>.\n\n— Tolstoy");

    assert_eq!(subject, "Your Daily Reading - January 1");
    assert!(html.contains("A thought with &lt;b&gt;markup&lt;/b&gt;."));
    assert!(!html.contains("<b>markup</b>"));
    assert!(html.contains(r#"<p class="author">&mdash; Tolstoy</p>"#));
    assert!(html.contains("January 1"));
}

#[test]
fn chapter_email_handles_double_dash_attribution() {
    let (_, html) = template::chapter_email(&key("03-03"), "Quote text here.\n\n-- Seneca");
    assert!(html.contains(r#"<p class="author">&mdash; Seneca</p>"#));
}

#[test]
fn fallback_email_names_the_missing_key() {
    let (subject, html) = template::fallback_email(&key("01-02"));

    assert_eq!(subject, "Daily Reading - No Chapter Found for 01-02");
    assert!(html.contains("No Chapter Available"));
    assert!(html.contains("January 2"));
    assert!(html.contains("01-02"));
}

#[test]
fn send_request_matches_brevo_wire_shape() {
    let request = SendEmailRequest {
        sender: Party {
            name: "Daily Book Reader",
            email: "reader@example.com",
        },
        to: vec![Address {
            email: "me@example.com",
        }],
        subject: "Your Daily Reading - January 1",
        html_content: "<html></html>",
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["sender"]["name"], "Daily Book Reader");
    assert_eq!(value["sender"]["email"], "reader@example.com");
    assert_eq!(value["to"][0]["email"], "me@example.com");
    assert_eq!(value["htmlContent"], "<html></html>");
    assert!(value.get("html_content").is_none());
}

#[test]
fn mail_config_reports_all_missing_variables() {
    let args = MailArgs {
        api_key: None,
        sender_email: None,
        sender_name: "Daily Book Reader".to_string(),
        recipient_email: None,
    };

    let err = MailConfig::from_args(&args).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("BREVO_API_KEY"));
    assert!(message.contains("SENDER_EMAIL"));
    assert!(message.contains("RECIPIENT_EMAIL"));
}

#[test]
fn mail_config_accepts_full_settings() {
    let args = MailArgs {
        api_key: Some("xkeysib-test".to_string()),
        sender_email: Some("reader@example.com".to_string()),
        sender_name: "Daily Book Reader".to_string(),
        recipient_email: Some("me@example.com".to_string()),
    };

    let config = MailConfig::from_args(&args)
        .unwrap()
        .with_base_url("http://localhost:9999");
    assert_eq!(config.base_url, "http://localhost:9999");
    assert_eq!(config.recipient_email, "me@example.com");
}
