//! Exports the [`build_site`] function which regenerates the "latest posts"
//! listing of the static index page: read the newest posts ([`list_posts`]),
//! convert each to an HTML fragment ([`crate::markdown::to_html`]), and
//! splice the fragments into the page's placeholder section
//! ([`inject_listing`]).

use crate::config::Config;
use crate::markdown;
use regex::Regex;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Rendered in place of the listing when there are no posts.
pub const NO_POSTS: &str = "<p>No posts yet.</p>";

const MARKDOWN_EXTENSION: &str = "md";

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r#"(?s)<section id="latest">(.*?)</section>"#).unwrap())
}

/// Rebuilds the listing in `config.index_file` from the newest posts in
/// `config.posts_directory`. Running it twice without new posts leaves the
/// page unchanged.
pub fn build_site(config: &Config) -> Result<()> {
    let listing = render_listing(&config.posts_directory, config.listing_size)?;

    let html = std::fs::read_to_string(&config.index_file).map_err(|err| Error::Index {
        path: config.index_file.clone(),
        err,
    })?;
    let html = inject_listing(&html, &listing).ok_or_else(|| Error::MissingPlaceholder {
        path: config.index_file.clone(),
    })?;
    std::fs::write(&config.index_file, html).map_err(|err| Error::Index {
        path: config.index_file.clone(),
        err,
    })?;

    tracing::info!(index = %config.index_file.display(), "rebuilt listing");
    Ok(())
}

/// Returns the paths of at most `limit` posts in `posts_directory`, newest
/// first.
///
/// Posts are ordered by file name, descending. That is chronological only
/// because every post file name starts with an ISO-8601 date
/// (`YYYY-MM-DD-...`); any other naming scheme must keep that prefix.
pub fn list_posts(posts_directory: &Path, limit: usize) -> Result<Vec<PathBuf>> {
    let annotate = |err| Error::ReadPosts {
        path: posts_directory.to_owned(),
        err,
    };

    let mut posts = Vec::new();
    for result in std::fs::read_dir(posts_directory).map_err(annotate)? {
        let entry = result.map_err(annotate)?;
        let path = entry.path();
        // `is_file` follows symlinks, so linked posts are listed too.
        if path.is_file() && path.extension() == Some(OsStr::new(MARKDOWN_EXTENSION)) {
            posts.push(path);
        }
    }

    posts.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    posts.truncate(limit);
    Ok(posts)
}

/// Returns the text of the first `# ` line of `markdown`, or the file stem
/// of `path` when there is none.
pub fn extract_title(markdown: &str, path: &Path) -> String {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# ").filter(|title| !title.trim().is_empty()))
        .map(|title| title.trim_end().to_owned())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

/// A post as it appears in the listing.
#[derive(Clone, Debug)]
pub struct ListedPost {
    pub title: String,
    pub html: String,
}

impl ListedPost {
    /// Reads the post at `path` and converts it to an `<article>` fragment.
    pub fn load(path: &Path) -> Result<ListedPost> {
        let markdown = std::fs::read_to_string(path).map_err(|err| Error::ReadPost {
            path: path.to_owned(),
            err,
        })?;
        Ok(ListedPost {
            title: extract_title(&markdown, path),
            html: format!("<article class=\"post\">{}</article>", markdown::to_html(&markdown)),
        })
    }
}

/// Renders the listing for the newest `limit` posts, or [`NO_POSTS`].
pub fn render_listing(posts_directory: &Path, limit: usize) -> Result<String> {
    let mut articles = Vec::new();
    for path in list_posts(posts_directory, limit)? {
        let post = ListedPost::load(&path)?;
        tracing::debug!(title = %post.title, path = %path.display(), "listing post");
        articles.push(post.html);
    }

    if articles.is_empty() {
        Ok(NO_POSTS.to_owned())
    } else {
        Ok(articles.join("\n"))
    }
}

/// Replaces the contents of the first `<section id="latest">` in `html` with
/// `listing`, verbatim. Later sections with the same id are left alone.
/// Returns `None` when there is no such section.
pub fn inject_listing(html: &str, listing: &str) -> Option<String> {
    let contents = placeholder().captures(html)?.get(1)?;
    let mut out = String::with_capacity(html.len() - contents.as_str().len() + listing.len());
    out.push_str(&html[..contents.start()]);
    out.push_str(listing);
    out.push_str(&html[contents.end()..]);
    Some(out)
}

/// The result of a site build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building the listing.
#[derive(Debug)]
pub enum Error {
    /// Returned when the posts directory can't be listed.
    ReadPosts { path: PathBuf, err: std::io::Error },

    /// Returned when a post file can't be read.
    ReadPost { path: PathBuf, err: std::io::Error },

    /// Returned when the index page can't be read or written.
    Index { path: PathBuf, err: std::io::Error },

    /// Returned when the index page has no `<section id="latest">`.
    MissingPlaceholder { path: PathBuf },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadPosts { path, err } => {
                write!(f, "Listing posts directory '{}': {}", path.display(), err)
            }
            Error::ReadPost { path, err } => {
                write!(f, "Reading post '{}': {}", path.display(), err)
            }
            Error::Index { path, err } => {
                write!(f, "Updating index page '{}': {}", path.display(), err)
            }
            Error::MissingPlaceholder { path } => write!(
                f,
                "Index page '{}' has no <section id=\"latest\"> placeholder",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadPosts { path: _, err } => Some(err),
            Error::ReadPost { path: _, err } => Some(err),
            Error::Index { path: _, err } => Some(err),
            Error::MissingPlaceholder { path: _ } => None,
        }
    }
}
