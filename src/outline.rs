use crate::error::{AppError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

/// Outline resolution against the course catalog.
///
/// Extracts a course identifier from any lesson URL and fetches the full
/// ordered outline from the catalog's public tRPC API. Outline metadata is
/// public, so no cookies are needed here; only the media extraction later
/// in the pipeline requires the browser login session.

/// Host serving the course catalog.
pub const COURSE_HOST: &str = "learn.deeplearning.ai";

const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

/// Reference to a course, derived once from the input URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRef {
    /// The course slug under `/courses/<slug>`.
    pub course_id: String,
    /// The URL the reference was derived from.
    pub source_url: String,
}

impl CourseRef {
    /// Extracts a course reference from a course homepage URL or any lesson
    /// URL under it (`/courses/<slug>/lesson/<id>/<lesson-slug>`).
    ///
    /// # Errors
    /// Returns `InvalidUrl` when the host is not the catalog host or the
    /// path is not under `/courses/<slug>`.
    pub fn parse(input_url: &str) -> Result<Self> {
        let parsed = Url::parse(input_url)?;

        if parsed.host_str() != Some(COURSE_HOST) {
            return Err(AppError::InvalidUrl(format!(
                "URL host must be {COURSE_HOST}"
            )));
        }

        let parts: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        if parts.len() < 2 || parts[0] != "courses" {
            return Err(AppError::InvalidUrl(
                "expected a course URL under /courses/<slug>".to_string(),
            ));
        }

        Ok(Self {
            course_id: parts[1].to_string(),
            source_url: input_url.to_string(),
        })
    }

    /// Canonical course homepage URL.
    pub fn base_url(&self) -> String {
        format!("https://{COURSE_HOST}/courses/{}", self.course_id)
    }
}

/// One entry of a listing block: the catalog's declared ordering of units.
#[derive(Debug, Deserialize)]
pub struct RawListingItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub key: Option<String>,
}

/// One section of the course listing, holding its units in declared order.
#[derive(Debug, Deserialize)]
pub struct RawListingBlock {
    #[serde(default)]
    pub content: Vec<RawListingItem>,
}

/// One unit record as the catalog serves it.
#[derive(Debug, Deserialize)]
pub struct RawUnit {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// The catalog's course payload: title, unit records keyed by native id, and
/// the ordered section listing that references them.
#[derive(Debug, Deserialize)]
pub struct RawCourse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lessons: HashMap<String, RawUnit>,
    #[serde(default)]
    pub listing: Vec<RawListingBlock>,
}

#[derive(Debug, Deserialize)]
struct TrpcEnvelope {
    result: Option<TrpcResult>,
}

#[derive(Debug, Deserialize)]
struct TrpcResult {
    data: TrpcData,
}

#[derive(Debug, Deserialize)]
struct TrpcData {
    json: RawCourse,
}

/// Parses a tRPC response body into the raw course payload.
///
/// Kept separate from the network call so it can be tested on canned JSON.
///
/// # Errors
/// `OutlineFetch` on malformed JSON, `CourseNotFound` when the API returned
/// no result payload for the slug.
pub fn parse_outline(body: &str, course_id: &str) -> Result<RawCourse> {
    let envelope: TrpcEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::OutlineFetch(format!("malformed API response: {e}")))?;

    match envelope.result {
        Some(result) => Ok(result.data.json),
        None => Err(AppError::CourseNotFound(course_id.to_string())),
    }
}

/// Client for the course catalog API.
pub struct CatalogClient {
    client: reqwest::Client,
}

impl CatalogClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn api_url(course_id: &str) -> String {
        let input = serde_json::json!({ "json": { "courseSlug": course_id } }).to_string();
        format!(
            "https://{COURSE_HOST}/api/trpc/course.getCourseBySlug?input={}",
            urlencoding::encode(&input)
        )
    }

    /// Fetches the full ordered outline for a course.
    ///
    /// One GET against the public API; no retry at this layer, a transient
    /// failure surfaces immediately.
    ///
    /// # Errors
    /// `OutlineFetch` on non-success status or a malformed body,
    /// `CourseNotFound` when the API has no course for the slug.
    pub async fn fetch_outline(&self, course: &CourseRef) -> Result<RawCourse> {
        let api_url = Self::api_url(&course.course_id);
        debug!(url = %api_url, "fetching course outline");

        let response = self
            .client
            .get(&api_url)
            .header("User-Agent", USER_AGENT)
            .header(
                "Accept",
                "application/json,text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Referer", format!("https://{COURSE_HOST}/"))
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| AppError::OutlineFetch(format!("API request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::CourseNotFound(course.course_id.clone()));
        }
        if !response.status().is_success() {
            return Err(AppError::OutlineFetch(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::OutlineFetch(format!("failed to read API response: {e}")))?;

        let raw = parse_outline(&body, &course.course_id)?;
        info!(
            course = %course.course_id,
            units = raw.lessons.len(),
            "outline fetched"
        );
        Ok(raw)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}
