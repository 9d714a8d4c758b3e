//! HTTP implementation of [`NotesApi`] for PostgREST-style resources.
//!
//! # Responsibility
//! - Translate list/create/update/delete into requests on `<base>/notes`.
//! - Attach the static credential headers to every request.
//! - Interpret status codes and bodies into notes or [`ApiError`].
//!
//! # Invariants
//! - Status is checked before the body is decoded.
//! - Row filters use the `id=eq.<id>` query form.
//! - Credentials and response bodies never reach the log.

use super::{ApiError, ApiResult, NotesApi};
use crate::config::{ClientConfig, ConfigError};
use crate::model::note::{Note, NoteDraft, NoteId};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};

const NOTES_RESOURCE: &str = "notes";
const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_NO_CONTENT: u16 = 204;

/// REST client bound to one configured store.
#[derive(Debug, Clone)]
pub struct RestNotesClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestNotesClient {
    /// Builds a client whose default headers carry the configured key.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let headers = default_headers(config)?;
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url().clone(),
        })
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        draft: Option<&NoteDraft>,
    ) -> ApiResult<(u16, Vec<u8>)> {
        let op = method.as_str().to_string();
        debug!("event=api_request module=api status=start method={} path={}", op, url.path());

        let mut request = self.http.request(method, url);
        if let Some(draft) = draft {
            request = request.json(draft);
        }

        let response = request.send().await.map_err(|err| {
            warn!("event=api_request module=api status=error method={} kind=network", op);
            ApiError::Network(err.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        debug!(
            "event=api_response module=api status=ok method={} http_status={} bytes={}",
            op,
            status,
            body.len()
        );
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl NotesApi for RestNotesClient {
    async fn list(&self) -> ApiResult<Vec<Note>> {
        let url = resource_url(&self.base_url, None)?;
        let (status, body) = self.send(Method::GET, url, None).await?;
        let notes = log_outcome("list", interpret_list(status, &body))?;
        info!("event=notes_list module=api status=ok count={}", notes.len());
        Ok(notes)
    }

    async fn create(&self, title: &str) -> ApiResult<Note> {
        let url = resource_url(&self.base_url, None)?;
        let draft = NoteDraft {
            title: title.to_string(),
        };
        let (status, body) = self.send(Method::POST, url, Some(&draft)).await?;
        let note = log_outcome("create", interpret_single(status, &body, STATUS_CREATED))?;
        info!("event=note_create module=api status=ok id={}", note.id);
        Ok(note)
    }

    async fn update(&self, id: &NoteId, title: &str) -> ApiResult<Note> {
        let url = resource_url(&self.base_url, Some(id))?;
        let draft = NoteDraft {
            title: title.to_string(),
        };
        let (status, body) = self.send(Method::PATCH, url, Some(&draft)).await?;
        let note = log_outcome("update", interpret_single(status, &body, STATUS_OK))?;
        info!("event=note_update module=api status=ok id={}", note.id);
        Ok(note)
    }

    async fn delete(&self, id: &NoteId) -> ApiResult<()> {
        let url = resource_url(&self.base_url, Some(id))?;
        let (status, _) = self.send(Method::DELETE, url, None).await?;
        let accepted = [STATUS_OK, STATUS_NO_CONTENT];
        log_outcome("delete", expect_status(status, &accepted))?;
        info!("event=note_delete module=api status=ok id={}", id);
        Ok(())
    }
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap, ConfigError> {
    let mut key = HeaderValue::from_str(config.api_key())
        .map_err(|_| ConfigError::InvalidApiKey)?;
    key.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
        .map_err(|_| ConfigError::InvalidApiKey)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("apikey"), key);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("prefer"),
        HeaderValue::from_static("return=representation"),
    );
    Ok(headers)
}

/// Builds `<base>/notes`, optionally filtered to one row.
///
/// Any query or fragment on `base` is dropped.
pub(crate) fn resource_url(base: &Url, id: Option<&str>) -> ApiResult<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(format!("`{base}` cannot be a base url")))?
        .pop_if_empty()
        .push(NOTES_RESOURCE);
    if let Some(id) = id {
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
    }
    Ok(url)
}

pub(crate) fn expect_status(status: u16, accepted: &[u16]) -> ApiResult<()> {
    if accepted.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::Server(status))
    }
}

/// Decodes a JSON array of rows, validating each one.
pub(crate) fn decode_notes(body: &[u8]) -> ApiResult<Vec<Note>> {
    let notes: Vec<Note> =
        serde_json::from_slice(body).map_err(|err| ApiError::Decoding(err.to_string()))?;
    for note in &notes {
        note.validate()
            .map_err(|err| ApiError::Decoding(err.to_string()))?;
    }
    Ok(notes)
}

pub(crate) fn interpret_list(status: u16, body: &[u8]) -> ApiResult<Vec<Note>> {
    expect_status(status, &[STATUS_OK])?;
    decode_notes(body)
}

/// Returns the first row of a `return=representation` response.
pub(crate) fn interpret_single(status: u16, body: &[u8], expected: u16) -> ApiResult<Note> {
    expect_status(status, &[expected])?;
    decode_notes(body)?.into_iter().next().ok_or(ApiError::NoData)
}

fn log_outcome<T>(op: &str, result: ApiResult<T>) -> ApiResult<T> {
    if let Err(err) = &result {
        let kind = match err {
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::NoData => "no_data",
            ApiError::Decoding(_) => "decoding",
            ApiError::Network(_) => "network",
            ApiError::Server(_) => "server",
        };
        warn!(
            "event=notes_{} module=api status=error kind={} http_status={}",
            op,
            kind,
            err.status().map_or_else(|| "-".to_string(), |code| code.to_string())
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{decode_notes, expect_status, interpret_list, interpret_single, resource_url};
    use crate::api::ApiError;
    use reqwest::Url;

    const ROWS: &str = r#"[
        {"id":"n1","created_at":"2025-08-06T10:00:00Z","title":"first"},
        {"id":"n2","created_at":"2025-08-07T10:00:00Z","title":"second"}
    ]"#;

    #[test]
    fn resource_url_appends_row_filter() {
        let base = Url::parse("https://db.example.com/rest/v1").unwrap();
        assert_eq!(
            resource_url(&base, None).unwrap().as_str(),
            "https://db.example.com/rest/v1/notes"
        );
        assert_eq!(
            resource_url(&base, Some("abc")).unwrap().as_str(),
            "https://db.example.com/rest/v1/notes?id=eq.abc"
        );
    }

    #[test]
    fn resource_url_keeps_query_out_of_the_path() {
        let base = Url::parse("https://db.example.com/rest/v1/?x=1#top").unwrap();
        assert_eq!(
            resource_url(&base, Some("n1")).unwrap().as_str(),
            "https://db.example.com/rest/v1/notes?id=eq.n1"
        );
    }

    #[test]
    fn resource_url_rejects_non_base_urls() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            resource_url(&base, None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn resource_url_encodes_unsafe_ids() {
        let base = Url::parse("https://db.example.com/").unwrap();
        let url = resource_url(&base, Some("a&b=c")).unwrap();
        assert_eq!(url.as_str(), "https://db.example.com/notes?id=eq.a%26b%3Dc");
    }

    #[test]
    fn list_preserves_order_and_fields() {
        let notes = interpret_list(200, ROWS.as_bytes()).unwrap();
        let ids: Vec<_> = notes.iter().map(|note| note.id.as_str()).collect();
        assert_eq!(ids, ["n1", "n2"]);
        assert_eq!(notes[1].title, "second");
    }

    #[test]
    fn status_is_checked_before_body() {
        assert_eq!(
            interpret_list(500, b"not json").unwrap_err(),
            ApiError::Server(500)
        );
        assert_eq!(
            interpret_single(200, ROWS.as_bytes(), 201).unwrap_err(),
            ApiError::Server(200)
        );
    }

    #[test]
    fn single_takes_first_row_or_reports_no_data() {
        let note = interpret_single(201, ROWS.as_bytes(), 201).unwrap();
        assert_eq!(note.id, "n1");
        assert_eq!(
            interpret_single(201, b"[]", 201).unwrap_err(),
            ApiError::NoData
        );
    }

    #[test]
    fn malformed_or_incomplete_rows_are_decoding_errors() {
        assert!(matches!(decode_notes(b"{}"), Err(ApiError::Decoding(_))));
        assert!(matches!(
            decode_notes(br#"[{"id":"n1","title":"missing timestamp"}]"#),
            Err(ApiError::Decoding(_))
        ));
        assert!(matches!(
            decode_notes(br#"[{"id":"","created_at":"2025","title":"t"}]"#),
            Err(ApiError::Decoding(_))
        ));
    }

    #[test]
    fn delete_accepts_ok_and_no_content_only() {
        assert!(expect_status(200, &[200, 204]).is_ok());
        assert!(expect_status(204, &[200, 204]).is_ok());
        assert_eq!(
            expect_status(404, &[200, 204]).unwrap_err(),
            ApiError::Server(404)
        );
    }
}
