//! A small client for the two Wikipedia REST endpoints the fetcher uses: the
//! featured-content feed for a date and the random page summary. The network
//! sits behind the [`Source`] trait so the fallback logic in
//! [`fetch_featured`] can be exercised without it.

use crate::config::{api_base, Config};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Where news-derived posts point their attribution.
pub const CURRENT_EVENTS_URL: &str = "https://en.wikipedia.org/wiki/Portal:Current_events";

/// Where posts point when the API gave no page URL.
pub const MAIN_PAGE_URL: &str = "https://en.wikipedia.org/wiki/Main_Page";

const RANDOM_TITLE: &str = "Interesting Topic";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Titles {
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DesktopUrls {
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContentUrls {
    #[serde(default)]
    pub desktop: Option<DesktopUrls>,
}

impl ContentUrls {
    fn page(&self) -> Option<&str> {
        self.desktop.as_ref()?.page.as_deref()
    }
}

/// Today's featured article (`tfa`) in the featured feed.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub titles: Titles,

    #[serde(default)]
    pub extract_html: Option<String>,

    #[serde(default)]
    pub content_urls: ContentUrls,
}

/// One "In the news" story.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewsStory {
    #[serde(default)]
    pub story: Option<String>,

    #[serde(default)]
    pub links: Vec<NewsLink>,
}

/// A page linked from a news story.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewsLink {
    #[serde(default)]
    pub titles: Titles,

    #[serde(default)]
    pub content_urls: ContentUrls,
}

/// The response of `feed/featured/YYYY/MM/DD`. Only the fields the fetcher
/// uses are modeled.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FeaturedFeed {
    #[serde(default)]
    pub tfa: Option<Article>,

    #[serde(default)]
    pub news: Vec<NewsStory>,
}

/// The response of `page/random/summary`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageSummary {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub extract: Option<String>,

    #[serde(default)]
    pub extract_html: Option<String>,

    #[serde(default)]
    pub content_urls: ContentUrls,
}

/// The content chosen for a post: a title, an HTML extract, and the page the
/// extract came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Featured {
    pub title: String,
    pub html: String,
    pub source_url: String,
}

/// Something that can answer the two API requests.
pub trait Source {
    /// Fetches the featured-content feed for `date`.
    fn featured_feed(&self, date: NaiveDate) -> Result<FeaturedFeed>;

    /// Fetches the summary of a random page.
    fn random_summary(&self) -> Result<PageSummary>;
}

/// Picks the featured content for `date`: the featured article if there is
/// one, else the first news story, else a random page. Any request or
/// decoding failure is returned as-is; falling back to other dates is the
/// caller's business.
pub fn fetch_featured<S: Source + ?Sized>(source: &S, date: NaiveDate) -> Result<Featured> {
    let feed = source.featured_feed(date)?;

    if let Some(tfa) = feed.tfa {
        return Ok(Featured {
            title: tfa
                .titles
                .display
                .ok_or(Error::MissingField("tfa.titles.display"))?,
            html: tfa.extract_html.unwrap_or_default(),
            source_url: page_or_main(&tfa.content_urls),
        });
    }

    if let Some(story) = feed.news.into_iter().next() {
        let mut html = String::from("<p>In the news:</p><ul>");
        for link in &story.links {
            let display = link.titles.display.as_deref().unwrap_or_default();
            match link.content_urls.page() {
                Some(page) => html.push_str(&format!("<li><a href=\"{}\">{}</a></li>", page, display)),
                None => html.push_str(&format!("<li>{}</li>", display)),
            }
        }
        html.push_str("</ul>");
        return Ok(Featured {
            title: story.story.ok_or(Error::MissingField("news[0].story"))?,
            html,
            source_url: CURRENT_EVENTS_URL.to_owned(),
        });
    }

    let summary = source.random_summary()?;
    Ok(Featured {
        source_url: page_or_main(&summary.content_urls),
        title: summary.title.unwrap_or_else(|| RANDOM_TITLE.to_owned()),
        html: summary
            .extract_html
            .or(summary.extract)
            .unwrap_or_default(),
    })
}

fn page_or_main(urls: &ContentUrls) -> String {
    urls.page().unwrap_or(MAIN_PAGE_URL).to_owned()
}

/// The live [`Source`], backed by a blocking HTTP client.
pub struct Client {
    http: reqwest::blocking::Client,
    api_url: Url,
}

impl Client {
    /// Builds a client from the API URL, user agent, and timeout in
    /// `config`. Every request carries `Accept: application/json`.
    pub fn new(config: &Config) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Client {
            http,
            api_url: api_base(config.api_url.clone()),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.api_url.join(path)?;
        tracing::debug!(%url, "requesting");
        let response = self.http.get(url).send()?.error_for_status()?;
        Ok(response.json()?)
    }
}

impl Source for Client {
    fn featured_feed(&self, date: NaiveDate) -> Result<FeaturedFeed> {
        self.get_json(&format!("feed/featured/{}", date.format("%Y/%m/%d")))
    }

    fn random_summary(&self) -> Result<PageSummary> {
        self.get_json("page/random/summary")
    }
}

/// The result of an API operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed API request.
#[derive(Debug)]
pub enum Error {
    /// Returned for transport errors, non-success statuses, and bodies that
    /// don't decode.
    Http(reqwest::Error),

    /// Returned when the endpoint URL can't be built from the API base URL.
    UrlParse(url::ParseError),

    /// Returned when a response lacks a field the post can't do without.
    MissingField(&'static str),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Http(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::MissingField(field) => write!(f, "response is missing `{}`", field),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::MissingField(_) => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    /// Converts a [`reqwest::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for requests.
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL joining.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
