//! Best-effort HTML to Markdown for the markup Notes stores in note bodies.
//!
//! Handles headings, bold, italic, links, list items, line breaks and
//! paragraphs. Everything else is stripped. Entities are left as they are.

use std::sync::LazyLock;

use regex::Regex;

fn re(pattern: &str) -> Regex {
    // Safe expect: all patterns below are constants.
    Regex::new(pattern).expect("valid markdown regex")
}

static HEADINGS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    (1..=6)
        .map(|level| {
            (
                re(&format!(r"(?is)<h{level}(?:\s[^>]*)?>(.*?)</h{level}>")),
                format!("{} ${{1}}\n", "#".repeat(level)),
            )
        })
        .collect()
});
// Open and close tags are matched as a pair; a lone tag is left for ANY_TAG.
static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?is)<b(?:\s[^>]*)?>(.*?)</b>|<strong(?:\s[^>]*)?>(.*?)</strong>")
});
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?is)<i(?:\s[^>]*)?>(.*?)</i>|<em(?:\s[^>]*)?>(.*?)</em>"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?is)<a\s[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#));
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)<li(?:\s[^>]*)?>(.*?)</li>"));
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)<br\s*/?>"));
static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| re(r"<[^>]+>"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| re(r"\n{3,}"));

pub fn html_to_markdown(html: &str) -> String {
    let mut text = html.to_string();
    for (heading, replacement) in HEADINGS.iter() {
        text = heading.replace_all(&text, replacement.as_str()).into_owned();
    }
    text = BOLD.replace_all(&text, "**${1}${2}**").into_owned();
    text = ITALIC.replace_all(&text, "*${1}${2}*").into_owned();
    text = LINK.replace_all(&text, "[${2}](${1})").into_owned();
    text = LIST_ITEM.replace_all(&text, "- ${1}\n").into_owned();
    text = LINE_BREAK.replace_all(&text, "\n").into_owned();
    text = PARAGRAPH.replace_all(&text, "${1}\n\n").into_owned();
    text = ANY_TAG.replace_all(&text, "").into_owned();
    text = BLANK_RUN.replace_all(&text, "\n\n").into_owned();
    text.trim().to_string()
}
