//! OAuth2 credential lifecycle for the Google APIs.
//!
//! Installed-app flow: the client secret lives in `<conf>/client_secret.json`
//! (as downloaded from the Google console), tokens are cached in
//! `<conf>/credentials.json`. Expired access tokens are refreshed
//! transparently; first-time authorization is an explicit `login` step that
//! prints the consent URL and reads the pasted code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::RemoteError;

const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Out-of-band redirect: Google shows the code for the user to paste back
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Scopes: full Drive access for listing and placing the report, Sheets
/// for the formatting batch update
const SCOPES: &str =
    "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/spreadsheets";

/// Refresh this long before the recorded expiry
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Client secret file as downloaded from the Google console
#[derive(Debug, Clone, Deserialize)]
struct ClientSecretFile {
    installed: ClientSecret,
}

#[derive(Debug, Clone, Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

/// Cached tokens (`credentials.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: String,
    expiry: DateTime<Utc>,
}

impl StoredTokens {
    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECONDS) >= self.expiry
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Manages Google OAuth2 credentials for the other adapters
pub struct Authenticator {
    conf_dir: PathBuf,
    secret: ClientSecret,
    client: reqwest::Client,
    tokens: Mutex<Option<StoredTokens>>,
}

impl Authenticator {
    /// Load the client secret from `<conf_dir>/client_secret.json`
    pub fn new(conf_dir: impl Into<PathBuf>) -> Result<Self> {
        let conf_dir = conf_dir.into();
        let secret_path = conf_dir.join("client_secret.json");
        let content = std::fs::read_to_string(&secret_path).with_context(|| {
            format!(
                "Failed to read client secret: {} (download it from the Google console)",
                secret_path.display()
            )
        })?;
        let secret: ClientSecretFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", secret_path.display()))?;

        Ok(Self {
            conf_dir,
            secret: secret.installed,
            client: reqwest::Client::new(),
            tokens: Mutex::new(None),
        })
    }

    fn credentials_path(&self) -> PathBuf {
        self.conf_dir.join("credentials.json")
    }

    fn auth_url(&self) -> &str {
        self.secret.auth_uri.as_deref().unwrap_or(DEFAULT_AUTH_URL)
    }

    fn token_url(&self) -> &str {
        self.secret
            .token_uri
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_URL)
    }

    /// Consent URL for the paste-code flow
    pub fn authorize_url(&self) -> String {
        let url = Url::parse_with_params(
            self.auth_url(),
            &[
                ("client_id", self.secret.client_id.as_str()),
                ("redirect_uri", REDIRECT_URI),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .expect("valid authorize url");
        url.into()
    }

    /// Current access token, refreshing the cached one if it has expired.
    pub async fn access_token(&self) -> Result<String, RemoteError> {
        let mut guard = self.tokens.lock().await;

        let mut tokens = match guard.take() {
            Some(tokens) => tokens,
            None => self.load_tokens()?,
        };

        if tokens.is_expired() {
            debug!("access token expired, refreshing");
            tokens = self.refresh(tokens.refresh_token).await?;
            self.save_tokens(&tokens)?;
        }

        let access_token = tokens.access_token.clone();
        *guard = Some(tokens);
        Ok(access_token)
    }

    /// Run the interactive consent flow and store the resulting tokens.
    pub async fn login(&self) -> Result<()> {
        println!("Open this URL in your browser and authorize access:\n");
        println!("  {}\n", self.authorize_url());
        print!("Paste the authorization code here: ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut code = String::new();
        std::io::stdin().read_line(&mut code)?;
        let code = code.trim();
        if code.is_empty() {
            anyhow::bail!("No authorization code provided");
        }

        let response = self
            .client
            .post(self.token_url())
            .form(&self.exchange_form(code))
            .send()
            .await
            .context("Failed to reach token endpoint")?;

        let token: TokenResponse = super::check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse token response")?;

        let refresh_token = token
            .refresh_token
            .context("Token response carried no refresh token")?;
        let tokens = StoredTokens {
            access_token: token.access_token,
            refresh_token,
            expiry: Utc::now() + Duration::seconds(token.expires_in),
        };
        self.save_tokens(&tokens)?;
        *self.tokens.lock().await = Some(tokens);

        info!("credentials saved to {}", self.credentials_path().display());
        Ok(())
    }

    /// Form body for exchanging a pasted authorization code
    fn exchange_form<'a>(&'a self, code: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", REDIRECT_URI),
        ]
    }

    /// Form body for refreshing an expired access token
    fn refresh_form<'a>(&'a self, refresh_token: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ]
    }

    async fn refresh(&self, refresh_token: String) -> Result<StoredTokens, RemoteError> {
        let response = self
            .client
            .post(self.token_url())
            .form(&self.refresh_form(&refresh_token))
            .send()
            .await?;

        let token: TokenResponse = super::check_status(response).await?.json().await?;

        Ok(StoredTokens {
            access_token: token.access_token,
            // Google omits the refresh token on refresh responses
            refresh_token: token.refresh_token.unwrap_or(refresh_token),
            expiry: Utc::now() + Duration::seconds(token.expires_in),
        })
    }

    fn load_tokens(&self) -> Result<StoredTokens, RemoteError> {
        let path = self.credentials_path();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            RemoteError::Auth(format!(
                "no stored credentials at {} ({e}); run `filegrid login` first",
                path.display()
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| RemoteError::Auth(format!("invalid credentials file: {e}")))
    }

    fn save_tokens(&self, tokens: &StoredTokens) -> Result<(), RemoteError> {
        let path = self.credentials_path();
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| RemoteError::Auth(format!("failed to serialize credentials: {e}")))?;
        std::fs::write(&path, content).map_err(|e| {
            RemoteError::Auth(format!("failed to write {}: {e}", path.display()))
        })
    }
}
