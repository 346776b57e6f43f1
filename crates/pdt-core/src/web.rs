//! Web collaborators: URL reachability and modinfo documents
//!
//! Identifier lists only accept URLs that answer; modinfo URLs point at a
//! JSON document listing mods:
//!
//! ```json
//! { "mods": [ { "name": "...", "author": "...", "version": "..." } ] }
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use crate::record::ModRecord;
use crate::{Error, Result};

/// Outcome of a reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub reachable: bool,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Human-readable reason for a failure
    pub detail: Option<String>,
}

impl Verdict {
    pub fn reachable(status: u16) -> Self {
        Self {
            reachable: true,
            status: Some(status),
            detail: None,
        }
    }

    pub fn unreachable(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            reachable: false,
            status,
            detail: Some(detail.into()),
        }
    }

    /// Convert a failed verdict into a validation error for `url`
    pub fn into_result(self, url: &str) -> Result<()> {
        if self.reachable {
            return Ok(());
        }
        let reason = match (self.status, self.detail) {
            (Some(code), Some(detail)) => format!("could not reach {url:?}; code: {code} ({detail})"),
            (Some(code), None) => format!("could not reach {url:?}; code: {code}"),
            (None, Some(detail)) => detail,
            (None, None) => format!("could not reach {url:?}"),
        };
        Err(Error::validation(url, reason))
    }
}

/// Checks whether a URL is syntactically valid and answers
#[async_trait]
pub trait UrlVerifier: Send + Sync {
    async fn verify(&self, url: &str) -> Verdict;
}

/// Reads the mod records listed by a modinfo document
#[async_trait]
pub trait ModInfoSource: Send + Sync {
    async fn fetch_mods(&self, url: &str) -> Result<Vec<ModRecord>>;
}

#[derive(Debug, Deserialize)]
struct ModInfoDocument {
    #[serde(default)]
    mods: Vec<ModRecord>,
}

/// Parse the body of the modinfo document served at `url`
pub fn parse_modinfo(url: &str, body: &str) -> Result<Vec<ModRecord>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(Error::validation(url, "modinfo document must be a JSON object"));
    }
    let document: ModInfoDocument = serde_json::from_value(value)?;
    Ok(document.mods)
}

/// HTTP implementation of [`UrlVerifier`] and [`ModInfoSource`]
#[derive(Debug, Clone, Default)]
pub struct WebClient {
    client: reqwest::Client,
}

impl WebClient {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject anything that is not an absolute http(s) URL
pub fn check_syntax(raw: &str) -> std::result::Result<url::Url, String> {
    let parsed = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(parsed),
        "http" | "https" => Err("URL has no host".to_string()),
        other => Err(format!("unsupported scheme {other:?}")),
    }
}

#[async_trait]
impl UrlVerifier for WebClient {
    async fn verify(&self, url: &str) -> Verdict {
        tracing::info!(url, "validating");

        let parsed = match check_syntax(url) {
            Ok(parsed) => parsed,
            Err(reason) => return Verdict::unreachable(None, reason),
        };

        match self.client.get(parsed).send().await {
            Ok(response) if response.status().is_success() => {
                Verdict::reachable(response.status().as_u16())
            }
            Ok(response) => Verdict::unreachable(Some(response.status().as_u16()), "non-success status"),
            Err(e) => Verdict::unreachable(e.status().map(|s| s.as_u16()), e.to_string()),
        }
    }
}

#[async_trait]
impl ModInfoSource for WebClient {
    async fn fetch_mods(&self, url: &str) -> Result<Vec<ModRecord>> {
        tracing::info!(url, "retrieving mods");
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mods = parse_modinfo(url, &body)?;
        tracing::info!(url, count = mods.len(), "parsed mods");
        Ok(mods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/donovanmods/mods")]
    #[case("http://example.com/modinfo.json")]
    fn accepts_http_urls(#[case] raw: &str) {
        assert!(check_syntax(raw).is_ok());
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://example.com/file")]
    #[case("file:///etc/passwd")]
    fn rejects_other_urls(#[case] raw: &str) {
        assert!(check_syntax(raw).is_err());
    }

    #[tokio::test]
    async fn malformed_url_is_unreachable_without_a_request() {
        let verdict = WebClient::new().verify("nope").await;
        assert!(!verdict.reachable);
        assert_eq!(verdict.status, None);
        assert!(verdict.detail.is_some());
    }

    #[test]
    fn failed_verdict_becomes_validation_error() {
        let err = Verdict::unreachable(Some(404), "non-success status")
            .into_result("https://x.test/a")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"https://x.test/a\" is not valid: could not reach \"https://x.test/a\"; code: 404 (non-success status)"
        );
        assert!(Verdict::reachable(200).into_result("https://x.test/a").is_ok());
    }

    #[test]
    fn parses_modinfo_documents() {
        let body = r#"{
            "mods": [
                {
                    "name": "First Mod",
                    "author": "Someone",
                    "version": "1.0",
                    "compatibility": "w57",
                    "description": "Does things",
                    "files": {"pak": "https://example.com/first.pak?raw=true"},
                    "imageURL": "https://example.com/first.png"
                },
                {"name": "Second Mod", "author": "Someone"}
            ]
        }"#;

        let mods = parse_modinfo("https://example.com/modinfo.json", body).unwrap();
        assert_eq!(mods.len(), 2);
        assert_eq!(mods[0].to_string(), "First Mod v1.0 by Someone");
        assert_eq!(
            mods[0].files.pak.as_deref(),
            Some("https://example.com/first.pak?raw=true")
        );
        assert!(mods[1].version.is_empty());
    }

    #[test]
    fn document_without_mods_is_empty() {
        assert!(parse_modinfo("https://x.test/m.json", "{}").unwrap().is_empty());
    }

    #[rstest]
    #[case("[]")]
    #[case(r#"[{"name": "A", "author": "B"}]"#)]
    #[case("\"mods\"")]
    fn non_object_documents_are_rejected(#[case] body: &str) {
        let err = parse_modinfo("https://x.test/m.json", body).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("must be a JSON object"));
    }
}
