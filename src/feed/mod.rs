//! Authenticated feed listing and media extraction
//!
//! Talks to a Reddit-style JSON API: an OAuth2 token exchange from
//! externally supplied credentials, then paginated listing of a user's
//! submissions. Credentials are opaque configuration; the engine never
//! writes them anywhere. Base URLs are injectable so tests can point the
//! client at a mock server.

use crate::extract::{MediaKind, ResourceRecord};
use crate::{ConfigError, DragnetError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Extensions treated as directly downloadable images
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"];

/// Extensions treated as directly downloadable video
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".mkv", ".webm", ".gifv"];

/// Page size requested from the listing endpoint (the API maximum)
const LISTING_PAGE_SIZE: usize = 100;

static TEXT_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("valid URL pattern"));

/// Externally supplied API credentials; opaque to the engine
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "client-id")]
    pub client_id: String,

    #[serde(rename = "client-secret")]
    pub client_secret: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Account name; with `password`, enables the password grant
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// Where the feed API lives; overridable for tests
#[derive(Debug, Clone)]
pub struct FeedEndpoints {
    /// Base URL for the token exchange
    pub auth_base: String,

    /// Base URL for authenticated API calls
    pub api_base: String,
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        Self {
            auth_base: "https://www.reddit.com".to_string(),
            api_base: "https://oauth.reddit.com".to_string(),
        }
    }
}

/// Where a feed media URL was found within a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMediaKind {
    /// The submission URL itself, by extension
    Direct,
    /// An `i.redd.it` image link
    HostedImage,
    /// A hosted video fallback URL
    HostedVideo,
    /// One entry of a gallery submission
    Gallery,
    /// The preview source image
    Preview,
    /// A URL embedded in the submission's self text
    TextEmbedded,
}

impl FeedMediaKind {
    fn context(&self) -> &'static str {
        match self {
            Self::Direct => "feed:direct",
            Self::HostedImage => "feed:hosted-image",
            Self::HostedVideo => "feed:hosted-video",
            Self::Gallery => "feed:gallery",
            Self::Preview => "feed:preview",
            Self::TextEmbedded => "feed:text",
        }
    }
}

/// One media URL extracted from one submission
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub url: String,
    pub kind: FeedMediaKind,
    pub title: String,
    pub post_id: String,
}

/// The submission fields the extractor cares about
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub media: Option<Value>,
    #[serde(default)]
    pub media_metadata: Option<Value>,
    #[serde(default)]
    pub preview: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authenticated feed API client
pub struct FeedClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    /// The listing URL most recently fetched, used as `source_page`
    listing_url: std::sync::Mutex<String>,
}

impl FeedClient {
    /// Exchanges credentials for an access token and returns a ready
    /// client
    pub async fn connect(
        credentials: &Credentials,
        endpoints: &FeedEndpoints,
    ) -> Result<Self, DragnetError> {
        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            return Err(ConfigError::MissingCredentials(
                "client-id and client-secret are required for feed access".to_string(),
            )
            .into());
        }

        let http = reqwest::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let grant: Vec<(&str, &str)> = match (&credentials.username, &credentials.password) {
            (Some(user), Some(pass)) => vec![
                ("grant_type", "password"),
                ("username", user.as_str()),
                ("password", pass.as_str()),
            ],
            _ => vec![("grant_type", "client_credentials")],
        };

        let response = http
            .post(format!("{}/api/v1/access_token", endpoints.auth_base))
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&grant)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DragnetError::Auth(format!(
                "token exchange failed with HTTP {}",
                response.status().as_u16()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            DragnetError::Auth(format!("malformed token response: {}", e))
        })?;

        tracing::info!("feed authentication succeeded");

        Ok(Self {
            http,
            api_base: endpoints.api_base.clone(),
            token: token.access_token,
            listing_url: std::sync::Mutex::new(String::new()),
        })
    }

    /// Lists a user's submissions, newest first, up to `limit`
    ///
    /// Pages through the listing with the `after` cursor until the feed is
    /// exhausted or the cap is reached.
    pub async fn list_submissions(
        &self,
        user: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Submission>, DragnetError> {
        let mut submissions = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/user/{}/submitted?raw_json=1&limit={}",
                self.api_base, user, LISTING_PAGE_SIZE
            );
            if let Some(cursor) = &after {
                url.push_str("&after=");
                url.push_str(cursor);
            }
            *self.listing_url.lock().unwrap() = url.clone();

            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|source| DragnetError::Http {
                    url: url.clone(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(DragnetError::Auth(format!(
                    "listing request failed with HTTP {}",
                    response.status().as_u16()
                )));
            }

            let listing: Listing = response.json().await?;
            let page_len = listing.data.children.len();
            submissions.extend(listing.data.children.into_iter().map(|c| c.data));

            tracing::debug!(user, fetched = submissions.len(), "listing page read");

            if let Some(cap) = limit {
                if submissions.len() >= cap {
                    submissions.truncate(cap);
                    break;
                }
            }

            after = listing.data.after;
            if after.is_none() || page_len == 0 {
                break;
            }
        }

        tracing::info!(user, total = submissions.len(), "feed listing complete");
        Ok(submissions)
    }

    /// The listing URL last fetched; records cite it as their source page
    pub fn source_page(&self) -> String {
        self.listing_url.lock().unwrap().clone()
    }
}

/// Extracts every media URL from one submission
pub fn extract_feed_items(submission: &Submission) -> Vec<FeedItem> {
    let mut items = Vec::new();
    let mut push = |url: String, kind: FeedMediaKind| {
        if items.iter().any(|existing: &FeedItem| existing.url == url) {
            return;
        }
        items.push(FeedItem {
            url,
            kind,
            title: submission.title.clone(),
            post_id: submission.id.clone(),
        });
    };

    if let Some(url) = &submission.url {
        let lower = url.to_lowercase();
        if has_media_extension(&lower) {
            push(url.clone(), FeedMediaKind::Direct);
        } else if lower.contains("i.redd.it") {
            push(url.clone(), FeedMediaKind::HostedImage);
        } else if lower.contains("v.redd.it") {
            if let Some(video_url) = hosted_video_url(submission, url) {
                push(video_url, FeedMediaKind::HostedVideo);
            }
        }
    }

    // Gallery entries: media_metadata -> { id: { "s": { "u": url } } }
    if let Some(Value::Object(map)) = &submission.media_metadata {
        for entry in map.values() {
            if let Some(url) = entry.pointer("/s/u").and_then(Value::as_str) {
                push(unescape_entities(url), FeedMediaKind::Gallery);
            }
        }
    }

    if let Some(preview) = &submission.preview {
        if let Some(Value::Array(images)) = preview.get("images") {
            for image in images {
                if let Some(url) = image.pointer("/source/url").and_then(Value::as_str) {
                    push(unescape_entities(url), FeedMediaKind::Preview);
                }
            }
        }
    }

    if let Some(text) = &submission.selftext {
        for m in TEXT_URL_PATTERN.find_iter(text) {
            if has_media_extension(&m.as_str().to_lowercase()) {
                push(m.as_str().to_string(), FeedMediaKind::TextEmbedded);
            }
        }
    }

    items
}

/// Converts feed items to resource records for the downloader
pub fn to_resource_records(items: &[FeedItem], source_page: &str) -> Vec<ResourceRecord> {
    items
        .iter()
        .map(|item| ResourceRecord {
            url: item.url.clone(),
            kind: feed_media_kind(item),
            context: item.kind.context().to_string(),
            source_page: source_page.to_string(),
        })
        .collect()
}

fn feed_media_kind(item: &FeedItem) -> MediaKind {
    let lower = item.url.to_lowercase();
    if item.kind == FeedMediaKind::HostedVideo
        || VIDEO_EXTENSIONS.iter().any(|ext| lower.contains(ext))
    {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

/// Resolves a hosted video URL: the API's fallback URL when present,
/// otherwise a DASH rendition guessed from the post URL
fn hosted_video_url(submission: &Submission, post_url: &str) -> Option<String> {
    if let Some(media) = &submission.media {
        if let Some(fallback) = media
            .pointer("/reddit_video/fallback_url")
            .and_then(Value::as_str)
        {
            return Some(fallback.to_string());
        }
    }

    let video_id = post_url.trim_end_matches('/').rsplit('/').next()?;
    if video_id.is_empty() {
        return None;
    }
    Some(format!("https://v.redd.it/{}/DASH_720.mp4", video_id))
}

fn has_media_extension(lower_url: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .chain(VIDEO_EXTENSIONS.iter())
        .any(|ext| lower_url.contains(ext))
}

/// Undoes the `&amp;` escaping the API applies inside URLs
fn unescape_entities(url: &str) -> String {
    url.replace("&amp;", "&")
}
