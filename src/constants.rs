// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips while walking a cursor.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// API version pinned in the `Notion-Version` header of every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Default root for all endpoint paths. Must end with `/` so relative
/// joins keep the `v1` segment.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1/";

/// Header carrying the per-request trace ID.
pub const TRACE_ID_HEADER: &str = "X-B3-TraceId";

pub const SEARCH_ENDPOINT: &str = "search";
pub const DATABASES_ENDPOINT: &str = "databases";

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Proxy port used when a proxy host is configured without a port.
pub const DEFAULT_PROXY_PORT: u16 = 80;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Whole-request timeout. Finite so a pagination walk can never hang.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Suffix appended to a date property ID to pick the end of its range.
pub const END_DATE_SUFFIX: &str = "#end";

/// Name given to tasks whose title property is missing.
///
/// Notion databases commonly end with an empty row; it still becomes a task.
pub const UNNAMED_TASK: &str = "?";

/// Smallest progress value used when effort and percent disagree.
///
/// A task with logged effort but 0% would read as not started (and the
/// reverse as done with no work); both sides get at least this much.
pub const MINIMAL_PROGRESS: f64 = 1.0;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing payloads and error bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
