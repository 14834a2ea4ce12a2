//! Converts between HTML and the small Markdown dialect posts are written in.
//!
//! [`from_html`] turns an API extract into Markdown for a post body.
//! [`to_html`] goes the other way for the index listing, but it is not a
//! Markdown parser: it recognizes a fixed grammar of block lines (title
//! heading, publication meta line, quote line, paragraph text) plus inline
//! links, and passes everything else through untouched. Nothing is escaped.

use htmd::options::{HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use regex::Regex;
use std::io;
use std::sync::OnceLock;

fn converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .options(Options {
            heading_style: HeadingStyle::Atx,
            ..Default::default()
        })
        .build()
}

fn blank_runs() -> &'static Regex {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    BLANK_RUNS.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

fn inline_link() -> &'static Regex {
    static INLINE_LINK: OnceLock<Regex> = OnceLock::new();
    INLINE_LINK.get_or_init(|| Regex::new(r"\[(.+?)\]\((https?://[^\s)]+)\)").unwrap())
}

/// Converts an HTML extract to Markdown with `#`-style headings. Runs of
/// blank lines collapse to a single blank line and the result is trimmed.
pub fn from_html(html: &str) -> io::Result<String> {
    let markdown = converter().convert(html)?;
    Ok(blank_runs()
        .replace_all(&markdown, "\n\n")
        .trim()
        .to_owned())
}

const META_PREFIX: &str = "*Published: ";

/// One line of a post, as far as [`to_html`] cares.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// `# text`
    Heading(&'a str),

    /// `*Published: date*`; holds the date.
    Meta(&'a str),

    /// `> text`
    Quote(&'a str),

    /// Anything else that isn't blank.
    Text(&'a str),
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Line<'a> {
        if let Some(text) = non_empty(line.strip_prefix("# ")) {
            return Line::Heading(text);
        }
        if let Some(date) = non_empty(
            line.strip_prefix(META_PREFIX)
                .and_then(|rest| rest.strip_suffix('*')),
        ) {
            return Line::Meta(date);
        }
        if let Some(text) = non_empty(line.strip_prefix("> ")) {
            return Line::Quote(text);
        }
        Line::Text(line)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Converts a post to an HTML fragment. Blank lines separate blocks; within
/// a block each heading, meta, and quote line becomes its own element and
/// consecutive text lines are gathered into one `<p>`.
pub fn to_html(markdown: &str) -> String {
    let mut elements: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    fn flush(paragraph: &mut Vec<&str>, elements: &mut Vec<String>) {
        if !paragraph.is_empty() {
            elements.push(format!("<p>{}</p>", paragraph.join("\n")));
            paragraph.clear();
        }
    }

    for raw in markdown.lines() {
        let line = raw.trim_end();
        if line.is_empty() {
            flush(&mut paragraph, &mut elements);
            continue;
        }
        let element = match Line::classify(line) {
            Line::Text(text) => {
                paragraph.push(text);
                continue;
            }
            Line::Heading(text) => format!("<h2>{}</h2>", text),
            Line::Meta(date) => format!("<div class=\"meta\">Published: {}</div>", date),
            Line::Quote(text) => format!("<blockquote>{}</blockquote>", text),
        };
        flush(&mut paragraph, &mut elements);
        elements.push(element);
    }
    flush(&mut paragraph, &mut elements);

    inline_link()
        .replace_all(&elements.join("\n"), "<a href=\"$2\">$1</a>")
        .into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Line::classify("# Title"), Line::Heading("Title"));
        assert_eq!(Line::classify("## Sub"), Line::Text("## Sub"));
        assert_eq!(
            Line::classify("*Published: 2024-01-01*"),
            Line::Meta("2024-01-01")
        );
        assert_eq!(
            Line::classify("*Published: 2024-01-01* later"),
            Line::Text("*Published: 2024-01-01* later")
        );
        assert_eq!(Line::classify("> quoted"), Line::Quote("quoted"));
        assert_eq!(Line::classify(">no space"), Line::Text(">no space"));
        assert_eq!(Line::classify("# "), Line::Text("# "));
    }

    #[test]
    fn test_to_html_post() {
        let markdown = "# Otters\n\n*Published: 2024-01-01*\n\n\
                        Otters are [mustelids](https://en.wikipedia.org/wiki/Mustelidae).\n\
                        They swim.\n\n\
                        > **Newsletter** — House ad · https://example.com\n\n\
                        — Source: Wikipedia (CC-BY-SA). Original: https://en.wikipedia.org/wiki/Otter\n\n";
        assert_eq!(
            to_html(markdown),
            "<h2>Otters</h2>\n\
             <div class=\"meta\">Published: 2024-01-01</div>\n\
             <p>Otters are <a href=\"https://en.wikipedia.org/wiki/Mustelidae\">mustelids</a>.\nThey swim.</p>\n\
             <blockquote>**Newsletter** — House ad · https://example.com</blockquote>\n\
             <p>— Source: Wikipedia (CC-BY-SA). Original: https://en.wikipedia.org/wiki/Otter</p>"
        );
    }

    #[test]
    fn test_to_html_relative_links_untouched() {
        assert_eq!(to_html("see [here](/wiki/Otter)"), "<p>see [here](/wiki/Otter)</p>");
    }

    #[test]
    fn test_to_html_does_not_escape() {
        assert_eq!(to_html("# <b>x</b> & y"), "<h2><b>x</b> & y</h2>");
    }

    #[test]
    fn test_from_html_headings_and_blank_lines() {
        let markdown = from_html("<h2>History</h2><p>One.</p><br><br><br><p>Two.</p>").unwrap();
        assert!(markdown.starts_with("## History"), "{:?}", markdown);
        assert!(!markdown.contains("\n\n\n"), "{:?}", markdown);
        assert!(markdown.ends_with("Two."), "{:?}", markdown);
    }

    #[test]
    fn test_from_html_empty() {
        assert_eq!(from_html("").unwrap(), "");
    }
}
