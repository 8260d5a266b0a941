//! Remote identity authority reached over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::entities::Principal;
use crate::domain::identity::{IdentityAuthority, IdentityError};

/// Introspects tokens by calling `GET <base>/user-info` on the user service.
///
/// The whole call (connect, headers and body) is bounded by the client
/// timeout. Dropping the returned future abandons the in-flight request.
#[derive(Debug, Clone)]
pub struct HttpIdentityAuthority {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpIdentityAuthority {
    /// Creates an authority client for `base_url`, e.g. `http://users:8000/api/user`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/user-info", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IdentityAuthority for HttpIdentityAuthority {
    async fn introspect(&self, token: &str) -> Result<Principal, IdentityError> {
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IdentityError::Unavailable(format!("no answer within {:?}", self.timeout))
                } else {
                    IdentityError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(IdentityError::Unavailable(format!("status {}", status.as_u16())));
        }
        if !status.is_success() {
            return Err(IdentityError::Rejected(format!("status {}", status.as_u16())));
        }

        response
            .json::<Principal>()
            .await
            .map_err(|e| IdentityError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn authority(server: &MockServer) -> HttpIdentityAuthority {
        HttpIdentityAuthority::new(
            &format!("{}/api/user/", server.uri()),
            Duration::from_millis(300),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_principal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/user-info"))
            .and(header("Authorization", "Bearer good-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "username": "carol",
                "is_admin": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let principal = authority(&server).await.introspect("good-token").await.unwrap();

        assert_eq!(
            principal,
            Principal {
                id: 3,
                username: "carol".to_string(),
                is_admin: true
            }
        );
    }

    #[tokio::test]
    async fn test_client_error_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
            .mount(&server)
            .await;

        let err = authority(&server).await.introspect("bad").await.unwrap_err();

        assert!(matches!(err, IdentityError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = authority(&server).await.introspect("any").await.unwrap_err();

        assert!(matches!(err, IdentityError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_authority_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 1, "username": "x", "is_admin": false}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = authority(&server).await.introspect("any").await.unwrap_err();

        assert!(matches!(err, IdentityError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unexpected_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "x"})))
            .mount(&server)
            .await;

        let err = authority(&server).await.introspect("any").await.unwrap_err();

        assert!(matches!(err, IdentityError::Malformed(_)));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let a = HttpIdentityAuthority::new("http://users:8000/api/user/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(a.endpoint(), "http://users:8000/api/user/user-info");
    }
}
