//! Firestore REST backend

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::value::{decode_fields, encode_fields};
use super::{Connect, DocumentPath, DocumentStore, RemoteDocument, WriteAck};
use crate::config::Credentials;
use crate::{Error, Result};

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com";
const PAGE_SIZE: &str = "300";

/// Creates a [`FirestoreStore`] from configured credentials
pub struct FirestoreConnector {
    credentials: Credentials,
}

impl FirestoreConnector {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl Connect for FirestoreConnector {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        tracing::info!("initializing Firestore client");
        let store: Arc<dyn DocumentStore> = Arc::new(FirestoreStore::new(&self.credentials)?);
        Ok(store)
    }
}

/// Document store backed by the Firestore REST API
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
    #[serde(rename = "updateTime", default)]
    update_time: Option<DateTime<Utc>>,
}

impl FirestoreDocument {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

impl FirestoreStore {
    /// Build a client for the configured project
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the project id is blank, if no access
    /// token is available outside emulator mode, or if the HTTP client cannot
    /// be built.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let project_id = credentials.project_id.trim();
        if project_id.is_empty() {
            return Err(Error::Connection {
                reason: "firebase.credentials.project_id is not set".to_string(),
            });
        }

        let host = match credentials.emulator_host.as_deref() {
            Some(emulator) => format!("http://{}", emulator.trim_start_matches("http://")),
            None => FIRESTORE_HOST.to_string(),
        };

        let token = credentials.access_token.clone().filter(|t| !t.is_empty());
        if token.is_none() && credentials.emulator_host.is_none() {
            return Err(Error::Connection {
                reason: "no access token configured (set firebase.credentials.access_token or PDT_ACCESS_TOKEN)"
                    .to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("pdt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Connection {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/v1/projects/{}/databases/{}/documents",
                host, project_id, credentials.database
            ),
            token,
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn url(&self, path: impl std::fmt::Display) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Turn a non-success response into a store error for `path`
async fn check(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::store(path, format!("{}: {}", status, body.trim())))
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>> {
        tracing::debug!(%path, "GET document");
        let response = self.request(Method::GET, self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: FirestoreDocument = check(response, &path.to_string()).await?.json().await?;
        Ok(Some(decode_fields(document.fields.as_ref())?))
    }

    async fn set(&self, path: &DocumentPath, data: &Value) -> Result<WriteAck> {
        tracing::debug!(%path, "PATCH document");
        let body = json!({ "fields": encode_fields(data)? });
        let response = self
            .request(Method::PATCH, self.url(path))
            .json(&body)
            .send()
            .await?;

        let document: FirestoreDocument = check(response, &path.to_string()).await?.json().await?;
        Ok(WriteAck {
            path: path.clone(),
            update_time: document.update_time,
        })
    }

    async fn create(&self, collection: &str, data: &Value) -> Result<WriteAck> {
        tracing::debug!(collection, "POST document");
        let body = json!({ "fields": encode_fields(data)? });
        let response = self
            .request(Method::POST, self.url(collection))
            .json(&body)
            .send()
            .await?;

        let document: FirestoreDocument = check(response, collection).await?.json().await?;
        Ok(WriteAck {
            path: DocumentPath::new(collection, document.id()),
            update_time: document.update_time,
        })
    }

    async fn delete(&self, path: &DocumentPath) -> Result<WriteAck> {
        tracing::debug!(%path, "DELETE document");
        let response = self.request(Method::DELETE, self.url(path)).send().await?;
        check(response, &path.to_string()).await?;
        Ok(WriteAck {
            path: path.clone(),
            update_time: None,
        })
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<RemoteDocument>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            tracing::debug!(collection, page = ?page_token, "LIST documents");
            let mut request = self
                .request(Method::GET, self.url(collection))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListResponse = check(request.send().await?, collection)
                .await?
                .json()
                .await?;

            for document in page.documents {
                documents.push(RemoteDocument {
                    id: document.id().to_string(),
                    data: decode_fields(document.fields.as_ref())?,
                });
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(documents)
    }

    async fn close(&self) -> Result<()> {
        tracing::debug!("closing Firestore client");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(project_id: &str, token: Option<&str>, emulator: Option<&str>) -> Credentials {
        Credentials {
            project_id: project_id.to_string(),
            access_token: token.map(str::to_string),
            emulator_host: emulator.map(str::to_string),
            ..Credentials::default()
        }
    }

    #[test]
    fn blank_project_is_a_connection_error() {
        let err = FirestoreStore::new(&credentials("  ", Some("t"), None))
            .err()
            .unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_token_is_a_connection_error() {
        let err = FirestoreStore::new(&credentials("daedalus", None, None))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[test]
    fn emulator_needs_no_token() {
        let store = FirestoreStore::new(&credentials("daedalus", None, Some("localhost:8080"))).unwrap();
        assert_eq!(
            store.url(DocumentPath::new("meta", "repositories")),
            "http://localhost:8080/v1/projects/daedalus/databases/(default)/documents/meta/repositories"
        );
    }

    #[test]
    fn production_urls_use_the_public_host() {
        let store = FirestoreStore::new(&credentials("daedalus", Some("tok"), None)).unwrap();
        assert_eq!(
            store.url("mods"),
            "https://firestore.googleapis.com/v1/projects/daedalus/databases/(default)/documents/mods"
        );
    }

    #[test]
    fn document_id_is_the_last_name_segment() {
        let document = FirestoreDocument {
            name: "projects/p/databases/(default)/documents/mods/AbC123".to_string(),
            fields: None,
            update_time: None,
        };
        assert_eq!(document.id(), "AbC123");
    }
}
