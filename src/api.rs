// API client module: a small blocking client for the Instagram Graph API.
// Posting is two calls in a row: create a media container that points at a
// public image URL, then publish that container.

use crate::config::Config;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    /// The Graph API only fetches images from public URLs, never local files.
    #[error("image must be a public http(s) URL (e.g. S3 or a CDN), got: {0}")]
    NotPublicUrl(String),
    #[error("invalid API endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("media creation failed")]
    MediaCreationFailed,
    #[error("media creation response carried no container id")]
    MissingCreationId,
    #[error("publish failed")]
    PublishFailed,
}

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON, or an empty object when it is not JSON.
    pub fn json_or_empty(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// The one HTTP operation the publisher needs: a body-less POST whose
/// parameters all travel in the query string.
pub trait Transport {
    fn post(&self, url: &Url) -> Result<HttpResponse, reqwest::Error>;
}

/// Blocking reqwest transport used by the binary.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &Url) -> Result<HttpResponse, reqwest::Error> {
        let res = self.client.post(url.clone()).send()?;
        let status = res.status().as_u16();
        let body = res.text().unwrap_or_default();
        Ok(HttpResponse { status, body })
    }
}

/// Container id returned by the create call. Only [`Publisher::create_container`]
/// produces one, so a publish always follows a successful creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationId(String);

impl CreationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
struct CreatedMedia {
    id: Option<Value>,
}

/// Accepts `http://` and `https://` URLs, case-insensitively.
pub fn is_public_url(reference: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://").expect("public url regex is valid"))
        .is_match(reference)
}

/// Publishes images for one business account.
pub struct Publisher<'a, T: Transport> {
    transport: T,
    config: &'a Config,
}

impl<'a, T: Transport> Publisher<'a, T> {
    pub fn new(transport: T, config: &'a Config) -> Self {
        Publisher { transport, config }
    }

    fn endpoint(&self, edge: &str) -> Result<Url, PublishError> {
        let url = Url::parse(&format!(
            "{}/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.api_version,
            self.config.business_id,
            edge
        ))
        .map_err(|e| PublishError::InvalidEndpoint(e.to_string()))?;
        Ok(url)
    }

    /// Stage a media container for `image_url`. Fails before any request when
    /// the reference is not a public URL.
    pub fn create_container(&self, image_url: &str, caption: &str) -> Result<CreationId, PublishError> {
        if !is_public_url(image_url) {
            return Err(PublishError::NotPublicUrl(image_url.to_string()));
        }
        let mut url = self.endpoint("media")?;
        url.query_pairs_mut()
            .append_pair("image_url", image_url)
            .append_pair("caption", caption)
            .append_pair("access_token", &self.config.access_token);

        let res = self.transport.post(&url)?;
        if !res.is_success() {
            log::error!("Create media failed ({}): {}", res.status, res.json_or_empty());
            return Err(PublishError::MediaCreationFailed);
        }
        let created: CreatedMedia =
            serde_json::from_str(&res.body).map_err(|_| PublishError::MissingCreationId)?;
        let id = match created.id {
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(PublishError::MissingCreationId),
        };
        log::info!("media container {} created", id);
        Ok(CreationId(id))
    }

    /// Publish a previously created container and return the API response.
    pub fn publish(&self, creation_id: &CreationId) -> Result<Value, PublishError> {
        let mut url = self.endpoint("media_publish")?;
        url.query_pairs_mut()
            .append_pair("creation_id", creation_id.as_str())
            .append_pair("access_token", &self.config.access_token);

        let res = self.transport.post(&url)?;
        let data = res.json_or_empty();
        if !res.is_success() {
            log::error!("Publish failed ({}): {}", res.status, data);
            return Err(PublishError::PublishFailed);
        }
        log::info!("container {} published", creation_id.as_str());
        Ok(data)
    }

    /// Create then publish. A container left behind by a failed publish is
    /// not cleaned up.
    pub fn post(&self, image_url: &str, caption: &str) -> Result<Value, PublishError> {
        let creation_id = self.create_container(image_url, caption)?;
        self.publish(&creation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENV_ACCESS_TOKEN, ENV_API_BASE, ENV_BUSINESS_ID};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records every URL and replays canned responses in order.
    struct FakeTransport {
        calls: RefCell<Vec<Url>>,
        responses: RefCell<VecDeque<HttpResponse>>,
    }

    impl FakeTransport {
        fn new(responses: &[(u16, &str)]) -> Self {
            FakeTransport {
                calls: RefCell::new(Vec::new()),
                responses: RefCell::new(
                    responses
                        .iter()
                        .map(|(status, body)| HttpResponse {
                            status: *status,
                            body: body.to_string(),
                        })
                        .collect(),
                ),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn call(&self, i: usize) -> Url {
            self.calls.borrow()[i].clone()
        }
    }

    impl Transport for &FakeTransport {
        fn post(&self, url: &Url) -> Result<HttpResponse, reqwest::Error> {
            self.calls.borrow_mut().push(url.clone());
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected extra request"))
        }
    }

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            ENV_BUSINESS_ID => Some("1784".to_string()),
            ENV_ACCESS_TOKEN => Some("tok".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    const IMAGE: &str = "https://cdn.example.com/tomato_harvest_nara.jpg";

    #[test]
    fn public_url_check() {
        assert!(is_public_url("https://cdn.example.com/a.jpg"));
        assert!(is_public_url("HTTP://cdn.example.com/a.jpg"));
        assert!(!is_public_url("/local/path.jpg"));
        assert!(!is_public_url("file:///local/path.jpg"));
        assert!(!is_public_url("ftp://cdn.example.com/a.jpg"));
    }

    #[test]
    fn local_path_is_rejected_without_network() {
        let config = config();
        let transport = FakeTransport::new(&[]);
        let publisher = Publisher::new(&transport, &config);

        let err = publisher.post("/local/path.jpg", "caption").unwrap_err();

        assert!(matches!(err, PublishError::NotPublicUrl(ref p) if p == "/local/path.jpg"));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn create_then_publish() {
        let config = config();
        let transport = FakeTransport::new(&[
            (200, r#"{"id":"17890"}"#),
            (200, r#"{"id":"18001"}"#),
        ]);
        let publisher = Publisher::new(&transport, &config);

        let published = publisher.post(IMAGE, "奈良の畑より。\n#トマト").unwrap();

        assert_eq!(published["id"], "18001");
        assert_eq!(transport.call_count(), 2);

        let create = transport.call(0);
        assert_eq!(create.path(), "/v21.0/1784/media");
        assert_eq!(query(&create, "image_url").as_deref(), Some(IMAGE));
        assert_eq!(query(&create, "caption").as_deref(), Some("奈良の畑より。\n#トマト"));
        assert_eq!(query(&create, "access_token").as_deref(), Some("tok"));

        let publish = transport.call(1);
        assert_eq!(publish.path(), "/v21.0/1784/media_publish");
        assert_eq!(query(&publish, "creation_id").as_deref(), Some("17890"));
        assert_eq!(query(&publish, "access_token").as_deref(), Some("tok"));
    }

    #[test]
    fn failed_creation_never_publishes() {
        let config = config();
        let transport = FakeTransport::new(&[(400, r#"{"error":{"message":"bad image"}}"#)]);
        let publisher = Publisher::new(&transport, &config);

        let err = publisher.post(IMAGE, "caption").unwrap_err();

        assert!(matches!(err, PublishError::MediaCreationFailed));
        assert_eq!(err.to_string(), "media creation failed");
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn failed_publish_reports_publish_error() {
        let config = config();
        let transport = FakeTransport::new(&[(200, r#"{"id":"17890"}"#), (500, "not json")]);
        let publisher = Publisher::new(&transport, &config);

        let err = publisher.post(IMAGE, "caption").unwrap_err();

        assert!(matches!(err, PublishError::PublishFailed));
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn success_without_id_stops_before_publish() {
        let config = config();
        let transport = FakeTransport::new(&[(200, "{}")]);
        let publisher = Publisher::new(&transport, &config);

        let err = publisher.post(IMAGE, "caption").unwrap_err();

        assert!(matches!(err, PublishError::MissingCreationId));
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn api_base_override_redirects_both_calls() {
        let config = Config::from_lookup(|key| match key {
            ENV_BUSINESS_ID => Some("1784".to_string()),
            ENV_ACCESS_TOKEN => Some("tok".to_string()),
            ENV_API_BASE => Some("http://127.0.0.1:8089/".to_string()),
            _ => None,
        })
        .unwrap();
        let transport = FakeTransport::new(&[(200, r#"{"id":"1"}"#), (200, r#"{"id":"2"}"#)]);
        let publisher = Publisher::new(&transport, &config);

        publisher.post(IMAGE, "caption").unwrap();

        for i in 0..2 {
            let url = transport.call(i);
            assert_eq!(url.host_str(), Some("127.0.0.1"));
            assert_eq!(url.port(), Some(8089));
        }
        assert_eq!(transport.call(0).path(), "/v21.0/1784/media");
    }

    #[test]
    fn numeric_container_id_is_accepted() {
        let config = config();
        let transport = FakeTransport::new(&[(200, r#"{"id":17890}"#)]);
        let publisher = Publisher::new(&transport, &config);

        let id = publisher.create_container(IMAGE, "caption").unwrap();

        assert_eq!(id.as_str(), "17890");
    }

    #[test]
    fn non_json_error_body_logs_empty_object() {
        let res = HttpResponse {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert!(!res.is_success());
        assert_eq!(res.json_or_empty(), serde_json::json!({}));
    }
}
