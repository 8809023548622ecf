//! HTTP helper for upstream JSON requests.
//!
//! Every upstream call goes through [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so that non-success statuses
//! and undecodable bodies surface as a [`SourceError`] with the response
//! details logged once. There is no retry: a single failed attempt is
//! reported to the caller.

use crate::SourceError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends an HTTP request and parses the response body as JSON.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the request cannot be sent or the body
/// cannot be read, [`SourceError::Status`] for any non-2xx status, and
/// [`SourceError::Json`] if the body is not valid JSON.
pub async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, SourceError> {
    let response = request.send().await?;

    let url = response.url().to_string();
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let text = response.text().await?;

    if !status.is_success() {
        log::error!(
            "Upstream request failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             body preview: {}",
            preview(&text),
        );
        return Err(SourceError::Status {
            status: status.as_u16(),
            url,
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {}",
            text.len(),
            preview(&text),
        );
        SourceError::Json(e)
    })
}

/// Truncates `text` to [`BODY_PREVIEW_LEN`] characters for logging.
fn preview(text: &str) -> String {
    if text.chars().count() > BODY_PREVIEW_LEN {
        let head: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(BODY_PREVIEW_LEN + 10);
        let p = preview(&body);
        assert_eq!(p.len(), BODY_PREVIEW_LEN + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(BODY_PREVIEW_LEN + 1);
        assert!(preview(&body).ends_with("..."));
        assert_eq!(preview("short"), "short");
    }
}
