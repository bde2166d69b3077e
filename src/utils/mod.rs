use anyhow::Result;
use std::time::Duration;
use url::Url;

use crate::HarvesterError;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url.trim()).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// First `max_chars` characters of a string, with an ellipsis when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Status endpoint of a WebDriver server
pub fn status_url(webdriver_url: &str) -> Result<Url> {
    let base = Url::parse(webdriver_url)
        .map_err(|_| anyhow::anyhow!("Invalid WebDriver URL: {}", webdriver_url))?;
    let mut status = base.clone();
    let path = format!("{}/status", base.path().trim_end_matches('/'));
    status.set_path(&path);
    Ok(status)
}

/// Check that a WebDriver server answers on its status endpoint
pub async fn check_webdriver(webdriver_url: &str) -> Result<(), HarvesterError> {
    let unavailable = |reason: String| HarvesterError::WebDriverUnavailable {
        url: webdriver_url.to_string(),
        reason,
    };

    let url = status_url(webdriver_url).map_err(|e| unavailable(e.to_string()))?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| unavailable(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| unavailable(format!("{} (is chromedriver running?)", e)))?;

    if !response.status().is_success() {
        return Err(unavailable(format!("HTTP {}", response.status())));
    }

    let body: serde_json::Value = response.json().await.map_err(|e| unavailable(e.to_string()))?;
    match body["value"]["ready"].as_bool() {
        Some(false) => Err(unavailable(
            body["value"]["message"]
                .as_str()
                .unwrap_or("server not ready")
                .to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_validate_and_normalize_url() {
        assert!(validate_and_normalize_url("https://example.com").is_ok());
        assert!(validate_and_normalize_url("http://example.com").is_ok());
        assert!(validate_and_normalize_url("ftp://example.com").is_err());
        assert!(validate_and_normalize_url("not-a-url").is_err());
        assert_eq!(
            validate_and_normalize_url("  https://www.youtube.com/watch?v=abc ").unwrap(),
            "https://www.youtube.com/watch?v=abc"
        );
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("hello world", 5), "hello…");
        assert_eq!(preview("नमस्ते", 2), "नम…");
    }

    #[test]
    fn test_status_url() {
        assert_eq!(
            status_url("http://localhost:4444").unwrap().as_str(),
            "http://localhost:4444/status"
        );
        assert_eq!(
            status_url("http://grid:4444/wd/hub/").unwrap().as_str(),
            "http://grid:4444/wd/hub/status"
        );
    }
}
