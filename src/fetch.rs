//! The fetcher: picks today's content with a fallback chain, renders it as a
//! post, writes it, and then runs the size guard over the project tree.
//!
//! The fallback chain is today's featured content, then yesterday's, then a
//! canned post. API failures are logged and never returned; the only errors
//! [`run`] reports are local I/O problems and the size guard.

use crate::ads::{self, pick_ad};
use crate::config::Config;
use crate::guard::{self, check_file_sizes};
use crate::markdown;
use crate::post::{write_post, Post};
use crate::wikipedia::{fetch_featured, Featured, Source, MAIN_PAGE_URL};
use chrono::NaiveDate;
use std::fmt;
use std::io;
use std::path::PathBuf;

const FALLBACK_TITLE: &str = "Daily Knowledge";
const FALLBACK_HTML: &str = "<p>This starter post proves the autopilot is live. \
                             Future posts will pull from public CC-BY-SA sources automatically.</p>";

/// Which link of the fallback chain produced the post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Today,
    Yesterday,
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Tier::Today => "today",
            Tier::Yesterday => "yesterday",
            Tier::Fallback => "fallback",
        })
    }
}

/// What a fetcher run produced.
#[derive(Debug)]
pub struct Outcome {
    /// The post file that was written.
    pub path: PathBuf,

    /// Where the post's content came from.
    pub tier: Tier,
}

/// The canned content used when both dated attempts fail.
pub fn fallback() -> Featured {
    Featured {
        title: FALLBACK_TITLE.to_owned(),
        html: FALLBACK_HTML.to_owned(),
        source_url: MAIN_PAGE_URL.to_owned(),
    }
}

/// Tries `today`, then the day before, then [`fallback`]. Never fails.
pub fn choose_featured<S: Source + ?Sized>(source: &S, today: NaiveDate) -> (Featured, Tier) {
    match fetch_featured(source, today) {
        Ok(featured) => return (featured, Tier::Today),
        Err(err) => tracing::warn!(date = %today, error = %err, "featured content unavailable"),
    }

    if let Some(yesterday) = today.pred_opt() {
        match fetch_featured(source, yesterday) {
            Ok(featured) => return (featured, Tier::Yesterday),
            Err(err) => {
                tracing::warn!(date = %yesterday, error = %err, "featured content unavailable")
            }
        }
    }

    tracing::warn!("using the canned fallback post");
    (fallback(), Tier::Fallback)
}

/// Runs the fetcher for `today`: loads the ad, chooses content, writes the
/// post, and checks file sizes. When the size guard fails the post has
/// already been written.
pub fn run<S: Source + ?Sized>(config: &Config, source: &S, today: NaiveDate) -> Result<Outcome> {
    let ads = match ads::load_ads(&config.ads_file) {
        Ok(ads) => ads,
        Err(err) => {
            tracing::warn!(
                path = %config.ads_file.display(),
                error = %err,
                "ignoring ad file"
            );
            Vec::new()
        }
    };
    let ad = pick_ad(&ads);
    tracing::debug!(ads = ads.len(), picked = ?ad.map(|ad| &ad.label), "loaded ads");

    let (featured, tier) = choose_featured(source, today);
    let body = markdown::from_html(&featured.html)?;

    let post = Post {
        date: today,
        title: &featured.title,
        body: &body,
        source_url: &featured.source_url,
        ad,
    };
    let path = write_post(&config.posts_directory, &post)?;
    tracing::info!(path = %path.display(), %tier, "wrote post");

    check_file_sizes(&config.project_root, config.max_file_size)?;
    Ok(Outcome { path, tier })
}

/// The result of a fetcher run.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed fetcher run.
#[derive(Debug)]
pub enum Error {
    /// Returned when converting or writing the post fails.
    Io(io::Error),

    /// Returned when the size guard trips after the post was written.
    Guard(guard::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Guard(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Guard(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. It allows us to use the
    /// `?` operator for file operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<guard::Error> for Error {
    /// Converts a [`guard::Error`] into an [`Error`].
    fn from(err: guard::Error) -> Error {
        Error::Guard(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::build;
    use crate::wikipedia::{self, FeaturedFeed, PageSummary};
    use std::cell::RefCell;
    use std::fs;

    /// Answers with a featured article for the dates in `ok` and fails for
    /// everything else, remembering the dates it was asked about.
    struct Stub {
        ok: Vec<NaiveDate>,
        asked: RefCell<Vec<NaiveDate>>,
    }

    impl Stub {
        fn new(ok: Vec<NaiveDate>) -> Stub {
            Stub {
                ok,
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl Source for Stub {
        fn featured_feed(&self, date: NaiveDate) -> wikipedia::Result<FeaturedFeed> {
            self.asked.borrow_mut().push(date);
            if !self.ok.contains(&date) {
                return Err(wikipedia::Error::MissingField("stub"));
            }
            Ok(serde_json::from_value(serde_json::json!({
                "tfa": {
                    "titles": {"display": format!("Article for {}", date)},
                    "extract_html": "<p>Some <b>bold</b> text.</p>",
                    "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Stub"}}
                }
            }))
            .unwrap())
        }

        fn random_summary(&self) -> wikipedia::Result<PageSummary> {
            Err(wikipedia::Error::MissingField("stub"))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn yesterday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    #[test]
    fn test_today_first() {
        let stub = Stub::new(vec![today(), yesterday()]);
        let (featured, tier) = choose_featured(&stub, today());
        assert_eq!(tier, Tier::Today);
        assert_eq!(featured.title, "Article for 2024-03-01");
        assert_eq!(*stub.asked.borrow(), vec![today()]);
    }

    #[test]
    fn test_yesterday_before_fallback() {
        let stub = Stub::new(vec![yesterday()]);
        let (featured, tier) = choose_featured(&stub, today());
        assert_eq!(tier, Tier::Yesterday);
        assert_eq!(featured.title, "Article for 2024-02-29");
        assert_eq!(*stub.asked.borrow(), vec![today(), yesterday()]);
    }

    #[test]
    fn test_fallback_after_both_dates_fail() {
        let stub = Stub::new(Vec::new());
        let (featured, tier) = choose_featured(&stub, today());
        assert_eq!(tier, Tier::Fallback);
        assert_eq!(featured, fallback());
        assert_eq!(*stub.asked.borrow(), vec![today(), yesterday()]);
    }

    #[test]
    fn test_every_tier_writes_a_post() {
        for (ok, wanted) in vec![
            (vec![today()], Tier::Today),
            (vec![yesterday()], Tier::Yesterday),
            (Vec::new(), Tier::Fallback),
        ] {
            let dir = tempfile::tempdir().unwrap();
            let config = Config::with_root(dir.path());
            let outcome = run(&config, &Stub::new(ok), today()).unwrap();
            assert_eq!(outcome.tier, wanted);
            assert!(outcome.path.starts_with(&config.posts_directory));
            assert!(outcome.path.is_file());
        }
    }

    #[test]
    fn test_fallback_post_contents() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());
        let outcome = run(&config, &Stub::new(Vec::new()), today()).unwrap();
        assert_eq!(
            outcome.path,
            config.posts_directory.join("2024-03-01-daily-knowledge.md")
        );
        let contents = fs::read_to_string(&outcome.path).unwrap();
        assert!(contents.starts_with("# Daily Knowledge\n\n*Published: 2024-03-01*\n\n"));
        assert!(contents.contains("This starter post proves the autopilot is live."));
        assert!(contents
            .trim_end()
            .ends_with("— Source: Wikipedia (CC-BY-SA). Original: https://en.wikipedia.org/wiki/Main_Page"));
    }

    #[test]
    fn test_ad_is_rendered_and_malformed_ads_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());

        fs::write(
            &config.ads_file,
            r#"{"ads": [{"label": "Newsletter", "disclosure": "House ad", "url": "https://example.com/n"}]}"#,
        )
        .unwrap();
        let outcome = run(&config, &Stub::new(vec![today()]), today()).unwrap();
        let contents = fs::read_to_string(&outcome.path).unwrap();
        assert!(contents.contains("\n> **Newsletter** — House ad · https://example.com/n\n"));

        fs::write(&config.ads_file, "[oops").unwrap();
        let outcome = run(&config, &Stub::new(vec![today()]), today()).unwrap();
        let contents = fs::read_to_string(&outcome.path).unwrap();
        assert!(!contents.contains("\n> "));
    }

    #[test]
    fn test_size_guard_trips_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_root(dir.path());
        config.max_file_size = 4096;
        fs::write(dir.path().join("huge.bin"), vec![0u8; 4097]).unwrap();

        match run(&config, &Stub::new(Vec::new()), today()) {
            Err(Error::Guard(guard::Error::TooLarge { path, .. })) => {
                assert_eq!(path, dir.path().join("huge.bin"));
            }
            other => panic!("wanted a size-guard error, got {:?}", other),
        }
        assert!(config
            .posts_directory
            .join("2024-03-01-daily-knowledge.md")
            .is_file());
    }

    #[test]
    fn test_written_post_lists_with_exact_title_and_date() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());
        run(&config, &Stub::new(vec![today()]), today()).unwrap();

        let listing = build::render_listing(&config.posts_directory, config.listing_size).unwrap();
        assert!(listing.contains("<h2>Article for 2024-03-01</h2>"), "{}", listing);
        assert!(
            listing.contains("<div class=\"meta\">Published: 2024-03-01</div>"),
            "{}",
            listing
        );
    }
}
