//! Defines the [`Post`] type and how a post becomes a Markdown file on disk.
//! A post's file name is its only structured metadata:
//! `{YYYY-MM-DD}-{slug}.md`.

use crate::ads::Ad;
use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};

/// The slug used when a title has no usable characters.
pub const DEFAULT_SLUG: &str = "daily-post";

const MAX_SLUG_LEN: usize = 60;
const MARKDOWN_EXTENSION: &str = "md";

/// A post ready to be written. `body` is already Markdown.
#[derive(Clone, Debug)]
pub struct Post<'a> {
    pub date: NaiveDate,
    pub title: &'a str,
    pub body: &'a str,
    pub source_url: &'a str,
    pub ad: Option<&'a Ad>,
}

impl Post<'_> {
    /// Renders the post document: title heading, publication line, body, the
    /// ad line when there is an ad, and the attribution line.
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "# {}\n\n*Published: {}*\n\n{}\n",
            self.title, self.date, self.body
        );
        if let Some(ad) = self.ad {
            out.push_str(&format!(
                "\n> **{}** — {} · {}\n",
                ad.label, ad.disclosure, ad.url
            ));
        }
        out.push_str(&format!(
            "\n— Source: Wikipedia (CC-BY-SA). Original: {}\n\n",
            self.source_url
        ));
        out
    }

    /// The post's file name, e.g. `2024-01-01-hello-world.md`.
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.date, slugify(self.title), MARKDOWN_EXTENSION)
    }
}

/// Lowercases `title`, replaces every run of characters outside `[a-z0-9-]`
/// with a single `-`, trims hyphens from both ends, and keeps at most 60
/// characters. Falls back to [`DEFAULT_SLUG`] when nothing is left.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_run = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
            in_run = false;
        } else if !in_run {
            slug.push('-');
            in_run = true;
        }
    }

    // Only ASCII is pushed, so byte and char positions agree.
    let mut slug = slug.trim_matches('-').to_owned();
    slug.truncate(MAX_SLUG_LEN);
    if slug.is_empty() {
        DEFAULT_SLUG.to_owned()
    } else {
        slug
    }
}

/// Writes `post` into `posts_directory`, creating the directory if needed and
/// overwriting any post with the same file name. Returns the written path.
pub fn write_post(posts_directory: &Path, post: &Post) -> io::Result<PathBuf> {
    std::fs::create_dir_all(posts_directory)?;
    let path = posts_directory.join(post.file_name());
    std::fs::write(&path, post.to_markdown())?;
    Ok(path)
}
