//! Existence classification
//!
//! Maps a raw fetch outcome for a profile URL to a coarse
//! [`ExistenceStatus`], using status-code rules first and content
//! heuristics for 200s. Platform-specific knowledge (URL templates,
//! display-name patterns) lives in the [`PlatformRegistry`]; the
//! classification ladder itself is uniform across platforms.

mod platforms;

pub use platforms::{Platform, PlatformRegistry};

use crate::fetch::FetchOutcome;
use serde::Serialize;

/// Maximum length of a transport-error message surfaced to the user
const ERROR_DISPLAY_LEN: usize = 50;

/// Phrases that mark a 200 response as a soft "not found" page
///
/// Lower-case; the body is lower-cased before scanning.
const NOT_FOUND_INDICATORS: &[&str] = &[
    "not found",
    "404",
    "does not exist",
    "no longer available",
    "page not found",
    "user not found",
    "profile not found",
    "找不到",
    "未被发现",
    "sorry, this page",
    "error 404",
    "this account doesn",
    "doesn't exist",
    "deactivated",
    "suspended",
    "isn't available",
];

/// Coarse existence status for one (platform, identifier) probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistenceStatus {
    Found,
    NotFound,
    Restricted,
    RateLimited,
    Error,
    HttpOther,
}

impl ExistenceStatus {
    /// Stable label used in the CSV mirror and console output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Restricted => "restricted",
            Self::RateLimited => "rate_limited",
            Self::Error => "error",
            Self::HttpOther => "http_other",
        }
    }
}

/// Result of probing one platform for one identifier
#[derive(Debug, Clone, Serialize)]
pub struct ExistenceRecord {
    /// Platform name from the registry
    pub platform: String,

    /// The profile URL that was probed
    pub url: String,

    /// Coarse classification
    pub status: ExistenceStatus,

    /// HTTP status code, absent on transport failure
    pub status_code: Option<u16>,

    /// Display name extracted from a found profile page
    pub display_name: Option<String>,
}

/// Classifies a fetch outcome for one platform probe
///
/// The ladder, in order: transport failure, 403, 429, 404, 200 with
/// not-found phrase scan, 200 clean (with display-name extraction), and
/// finally any other status as `http_other`.
pub fn classify(
    platform: &Platform,
    url: &str,
    identifier: &str,
    outcome: &FetchOutcome,
) -> ExistenceRecord {
    let record = |status, status_code, display_name| ExistenceRecord {
        platform: platform.name.clone(),
        url: url.to_string(),
        status,
        status_code,
        display_name,
    };

    match outcome {
        FetchOutcome::TransportError { message, .. } => {
            tracing::warn!(
                platform = %platform.name,
                "probe failed: {}",
                truncate_error(message)
            );
            record(ExistenceStatus::Error, None, None)
        }
        FetchOutcome::Response { status, body, .. } => match status {
            403 => record(ExistenceStatus::Restricted, Some(*status), None),
            429 => record(ExistenceStatus::RateLimited, Some(*status), None),
            404 => record(ExistenceStatus::NotFound, Some(*status), None),
            200 => {
                if body_says_not_found(body) {
                    record(ExistenceStatus::NotFound, Some(*status), None)
                } else {
                    let display_name = platform.extract_display_name(body, identifier);
                    record(ExistenceStatus::Found, Some(*status), display_name)
                }
            }
            other => record(ExistenceStatus::HttpOther, Some(*other), None),
        },
    }
}

/// Scans a lower-cased copy of the body for any not-found indicator
fn body_says_not_found(body: &str) -> bool {
    let lower = body.to_lowercase();
    NOT_FOUND_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
}

/// Truncates a transport-error message for display
fn truncate_error(message: &str) -> String {
    if message.chars().count() <= ERROR_DISPLAY_LEN {
        message.to_string()
    } else {
        message.chars().take(ERROR_DISPLAY_LEN).collect()
    }
}

/// Sorts records for display: found entries first, then alphabetically by
/// platform name
pub fn sort_for_display(records: &mut [ExistenceRecord]) {
    records.sort_by(|a, b| {
        let a_found = a.status != ExistenceStatus::Found;
        let b_found = b.status != ExistenceStatus::Found;
        a_found
            .cmp(&b_found)
            .then_with(|| a.platform.cmp(&b.platform))
    });
}
