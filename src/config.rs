//! Loads the project configuration shared by the fetcher and the site
//! builder. The project file is `autopilot.yaml`, found by walking up from a
//! starting directory.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "autopilot.yaml";

const DEFAULT_API_URL: &str = "https://en.wikipedia.org/api/rest_v1/";
const DEFAULT_USER_AGENT: &str =
    "AutopilotKnowledgeEngine/1.0 (+https://github.com/expectations251/ake-autopilot)";

#[derive(Deserialize)]
struct TimeoutSecs(u64);
impl Default for TimeoutSecs {
    fn default() -> Self {
        TimeoutSecs(20)
    }
}

#[derive(Deserialize)]
struct ListingSize(usize);
impl Default for ListingSize {
    fn default() -> Self {
        ListingSize(10)
    }
}

#[derive(Deserialize)]
struct MaxFileSize(u64);
impl Default for MaxFileSize {
    fn default() -> Self {
        MaxFileSize(100 * 1024 * 1024)
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    posts_directory: Option<PathBuf>,

    #[serde(default)]
    index_file: Option<PathBuf>,

    #[serde(default)]
    ads_file: Option<PathBuf>,

    #[serde(default)]
    api_url: Option<Url>,

    #[serde(default)]
    user_agent: Option<String>,

    #[serde(default)]
    timeout_secs: TimeoutSecs,

    #[serde(default)]
    listing_size: ListingSize,

    #[serde(default)]
    max_file_size: MaxFileSize,
}

/// Everything the fetcher and the site builder need to know about where
/// things live and how to talk to the API.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory scanned by the size guard. Relative paths in the project
    /// file are resolved against it.
    pub project_root: PathBuf,

    /// Where post files are written and read.
    pub posts_directory: PathBuf,

    /// The static page holding the `<section id="latest">` placeholder.
    pub index_file: PathBuf,

    /// The JSON file listing house ads.
    pub ads_file: PathBuf,

    /// The base URL of the Wikipedia REST API. Always ends in a trailing
    /// slash once loaded; see [`api_base`].
    pub api_url: Url,

    /// Sent as `User-Agent` on every API request.
    pub user_agent: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// The number of posts listed on the index page.
    pub listing_size: usize,

    /// The largest file (in bytes) the size guard tolerates.
    pub max_file_size: u64,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`]. If none is
    /// found, returns the default configuration rooted at `dir`.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(candidate) = current {
            let path = candidate.join(PROJECT_FILE);
            if path.is_file() {
                return match Config::from_project_file(&path) {
                    Ok(config) => Ok(config),
                    Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
                };
            }
            current = candidate.parent();
        }
        tracing::debug!(
            dir = %dir.display(),
            "no `{}` found; using defaults",
            PROJECT_FILE
        );
        Ok(Config::from_project(dir, Project::default()))
    }

    /// Loads the configuration from a specific project file. The file's
    /// directory becomes the project root.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config::from_project(project_root, project)),
        }
    }

    /// The default configuration rooted at `project_root`.
    pub fn with_root(project_root: &Path) -> Config {
        Config::from_project(project_root, Project::default())
    }

    fn from_project(project_root: &Path, project: Project) -> Config {
        let resolve = |path: Option<PathBuf>, default: &str| {
            project_root.join(path.unwrap_or_else(|| PathBuf::from(default)))
        };
        Config {
            project_root: project_root.to_owned(),
            posts_directory: resolve(project.posts_directory, "site/posts"),
            index_file: resolve(project.index_file, "site/index.html"),
            ads_file: resolve(project.ads_file, "house_ads.json"),
            api_url: api_base(match project.api_url {
                Some(url) => url,
                None => Url::parse(DEFAULT_API_URL).expect("valid default API URL"),
            }),
            user_agent: project
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            timeout: Duration::from_secs(project.timeout_secs.0),
            listing_size: project.listing_size.0,
            max_file_size: project.max_file_size.0,
        }
    }
}

/// Makes `url` usable as a base for [`Url::join`]. Without a trailing
/// slash, joining `feed/featured/...` onto `.../rest_v1` would replace
/// `rest_v1` instead of descending into it.
pub fn api_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
