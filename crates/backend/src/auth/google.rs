//! Google OAuth 2.0 authorization-code client.
//!
//! [`GoogleClient::discover`] resolves the provider endpoints from the OpenID
//! discovery document once at startup. [`GoogleClient::exchange_code`] then
//! turns an authorization code into a [`UserProfile`] with two calls:
//!
//! 1. code → access token at the token endpoint
//! 2. access token → profile at the userinfo endpoint
//!
//! Provider failures end the request; nothing is retried.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{GoogleConfig, UserProfile};

const LOGIN_SCOPES: &str = "openid profile email";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("discovery failed: {0}")]
    Discovery(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),
}

impl ProviderError {
    /// Stable identifier for the failed step.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::Client(_) => "client_setup_failed",
            ProviderError::Discovery(_) => "discovery_failed",
            ProviderError::TokenExchange(_) => "token_exchange_failed",
            ProviderError::ProfileFetch(_) => "profile_fetch_failed",
        }
    }
}

/// Endpoints published in the provider's discovery document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEndpoints {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleClient {
    http: Client,
    config: GoogleConfig,
    endpoints: ProviderEndpoints,
    authorize_url: Url,
}

impl GoogleClient {
    /// Fetch the discovery document and build a client for its endpoints.
    pub async fn discover(config: GoogleConfig) -> Result<Self, ProviderError> {
        let http = build_http_client(&config)?;

        let response = http
            .get(&config.discovery_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ProviderError::Discovery(e.to_string()))?;

        let endpoints: ProviderEndpoints = response
            .json()
            .await
            .map_err(|e| ProviderError::Discovery(format!("invalid discovery document: {}", e)))?;

        tracing::info!(
            "Resolved provider endpoints from {}: token={}, userinfo={}",
            config.discovery_url,
            endpoints.token_endpoint,
            endpoints.userinfo_endpoint
        );

        Self::build(http, config, endpoints)
    }

    pub fn with_endpoints(
        config: GoogleConfig,
        endpoints: ProviderEndpoints,
    ) -> Result<Self, ProviderError> {
        let http = build_http_client(&config)?;
        Self::build(http, config, endpoints)
    }

    fn build(
        http: Client,
        config: GoogleConfig,
        endpoints: ProviderEndpoints,
    ) -> Result<Self, ProviderError> {
        let parse = |endpoint: &str| {
            Url::parse(endpoint).map_err(|e| {
                ProviderError::Discovery(format!("invalid endpoint {:?}: {}", endpoint, e))
            })
        };

        let authorize_url = parse(&endpoints.authorization_endpoint)?;
        parse(&endpoints.token_endpoint)?;
        parse(&endpoints.userinfo_endpoint)?;

        Ok(Self {
            http,
            config,
            endpoints,
            authorize_url,
        })
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    /// Provider consent page the browser is sent to by `/login`.
    pub fn authorization_url(&self) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", LOGIN_SCOPES);

        url.to_string()
    }

    /// Provider sign-out page used by `/logout`.
    pub fn logout_url(&self) -> &str {
        self.endpoints
            .end_session_endpoint
            .as_deref()
            .unwrap_or(&self.config.logout_url)
    }

    /// Exchange an authorization code for the signed-in user's profile.
    pub async fn exchange_code(&self, code: &str) -> Result<UserProfile, ProviderError> {
        let access_token = self.request_access_token(code).await?;
        self.fetch_profile(&access_token).await
    }

    async fn request_access_token(&self, code: &str) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(&self.endpoints.token_endpoint)
            .form(&TokenRequest {
                code,
                client_id: &self.config.client_id,
                client_secret: &self.config.client_secret,
                redirect_uri: &self.config.redirect_uri,
                grant_type: "authorization_code",
            })
            .send()
            .await
            .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

        let status = response.status();
        let tokens: GoogleTokenResponse = response.json().await.map_err(|e| {
            ProviderError::TokenExchange(format!("unreadable response ({}): {}", status, e))
        })?;

        match tokens.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ProviderError::TokenExchange(format!(
                "no access_token in response ({}): {}",
                status,
                tokens.error.as_deref().unwrap_or("no error given")
            ))),
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, ProviderError> {
        let response = self
            .http
            .get(&self.endpoints.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::ProfileFetch(e.to_string()))?;

        let status = response.status();
        let user_info: GoogleUserInfo = response.json().await.map_err(|e| {
            ProviderError::ProfileFetch(format!("unreadable response ({}): {}", status, e))
        })?;

        match user_info.email {
            Some(email) if !email.is_empty() => Ok(UserProfile::new(email, user_info.name)),
            _ => Err(ProviderError::ProfileFetch(format!(
                "no email in userinfo response ({})",
                status
            ))),
        }
    }
}

fn build_http_client(config: &GoogleConfig) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn test_google_config(discovery_url: String) -> GoogleConfig {
        GoogleConfig {
            client_id: "mock_client_id".to_string(),
            client_secret: "mock_secret".to_string(),
            discovery_url,
            redirect_uri: "http://127.0.0.1:3000/auth".to_string(),
            logout_url: "https://accounts.google.com/Logout".to_string(),
            http_timeout: Duration::from_secs(5),
        }
    }

    pub(crate) fn mock_endpoints(server: &MockServer) -> ProviderEndpoints {
        ProviderEndpoints {
            authorization_endpoint: format!("{}/authorize", server.uri()),
            token_endpoint: format!("{}/token", server.uri()),
            userinfo_endpoint: format!("{}/userinfo", server.uri()),
            end_session_endpoint: None,
        }
    }

    async fn setup() -> (MockServer, GoogleClient) {
        let server = MockServer::start().await;
        let config = test_google_config(format!("{}/discovery", server.uri()));
        let client = GoogleClient::with_endpoints(config, mock_endpoints(&server))
            .expect("client should build");
        (server, client)
    }

    #[tokio::test]
    async fn test_discovery_resolves_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "issuer": "https://accounts.google.com",
                "authorization_endpoint": "https://accounts.google.com/o/oauth2/v2/auth",
                "token_endpoint": "https://oauth2.googleapis.com/token",
                "userinfo_endpoint": "https://openidconnect.googleapis.com/v1/userinfo",
                "revocation_endpoint": "https://oauth2.googleapis.com/revoke"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_google_config(format!(
            "{}/.well-known/openid-configuration",
            server.uri()
        ));
        let client = GoogleClient::discover(config).await.expect("should discover");

        assert_eq!(
            client.endpoints().token_endpoint,
            "https://oauth2.googleapis.com/token"
        );
        assert_eq!(client.logout_url(), "https://accounts.google.com/Logout");
    }

    #[tokio::test]
    async fn test_discovery_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = test_google_config(format!("{}/discovery", server.uri()));
        let err = GoogleClient::discover(config).await.err().expect("should fail");
        assert_eq!(err.code(), "discovery_failed");
    }

    #[tokio::test]
    async fn test_with_endpoints_makes_no_discovery_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = GoogleClient::with_endpoints(
            test_google_config(format!("{}/discovery", server.uri())),
            mock_endpoints(&server),
        )
        .expect("client should build without discovery");
        assert_eq!(client.endpoints().token_endpoint, format!("{}/token", server.uri()));
    }

    #[test]
    fn test_error_codes_name_the_failed_step() {
        assert_eq!(
            ProviderError::Client("tls".to_string()).code(),
            "client_setup_failed"
        );
        assert_eq!(
            ProviderError::Discovery("down".to_string()).code(),
            "discovery_failed"
        );
        assert_eq!(
            ProviderError::TokenExchange("denied".to_string()).code(),
            "token_exchange_failed"
        );
        assert_eq!(
            ProviderError::ProfileFetch("no email".to_string()).code(),
            "profile_fetch_failed"
        );
    }

    #[tokio::test]
    async fn test_end_session_endpoint_preferred_for_logout() {
        let server = MockServer::start().await;
        let mut endpoints = mock_endpoints(&server);
        endpoints.end_session_endpoint = Some(format!("{}/logout", server.uri()));

        let client = GoogleClient::with_endpoints(
            test_google_config(format!("{}/discovery", server.uri())),
            endpoints,
        )
        .unwrap();

        assert_eq!(client.logout_url(), format!("{}/logout", server.uri()));
    }

    #[tokio::test]
    async fn test_authorization_url_parameters() {
        let (server, client) = setup().await;

        let url = Url::parse(&client.authorization_url()).unwrap();
        assert_eq!(url.path(), "/authorize");
        assert!(url.as_str().starts_with(&server.uri()));

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params.get("client_id").map(String::as_str), Some("mock_client_id"));
        assert_eq!(
            params.get("redirect_uri").map(String::as_str),
            Some("http://127.0.0.1:3000/auth")
        );
        assert_eq!(params.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(
            params.get("scope").map(String::as_str),
            Some("openid profile email")
        );
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=goodcode"))
            .and(body_string_contains("client_secret=mock_secret"))
            .and(body_string_contains(
                "redirect_uri=http%3A%2F%2F127.0.0.1%3A3000%2Fauth",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "abc",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1234",
                "email": "a@example.com",
                "name": "A"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client.exchange_code("goodcode").await.expect("should exchange");
        assert_eq!(profile, UserProfile::new("a@example.com", Some("A".to_string())));
        assert_eq!(profile.role, "user");
    }

    #[tokio::test]
    async fn test_missing_access_token_skips_profile_call() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client.exchange_code("badcode").await.unwrap_err();
        assert!(matches!(err, ProviderError::TokenExchange(_)));
        assert_eq!(err.code(), "token_exchange_failed");
    }

    #[tokio::test]
    async fn test_non_json_token_response_fails_exchange() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client.exchange_code("code").await.unwrap_err();
        assert!(matches!(err, ProviderError::TokenExchange(_)));
    }

    #[tokio::test]
    async fn test_missing_email_fails_profile_fetch() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "abc" })),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "sub": "1234", "name": "A" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client.exchange_code("code").await.unwrap_err();
        assert!(matches!(err, ProviderError::ProfileFetch(_)));
        assert_eq!(err.code(), "profile_fetch_failed");
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        let mut config = test_google_config(format!("{}/discovery", server.uri()));
        config.http_timeout = Duration::from_millis(200);
        let client = GoogleClient::with_endpoints(config, mock_endpoints(&server)).unwrap();

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "abc" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client.exchange_code("code").await.unwrap_err();
        assert!(matches!(err, ProviderError::TokenExchange(_)));
    }
}
