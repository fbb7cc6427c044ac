//! OAuth2 installed-app flow
//!
//! Drives the one-time browser consent: bind a local callback listener, hand
//! the caller a consent URL to show the user, block until the provider
//! redirects back with an authorization code, exchange the code for a token
//! set. Also refreshes expired access tokens from the stored refresh token.
//!
//! The listener handles exactly one redirect and then shuts down. Binding
//! happens after the client-secret file has been parsed, so a malformed
//! secret never reaches the bind step.

use jiff::{SignedDuration, Timestamp};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use gd_core::{ClientSecrets, Error, Result, StoredCredentials, DRIVE_SCOPE};

/// Authorization endpoint used when only an authorized-user file is available
///
/// Authorized-user credential files record the token endpoint but not the
/// authorization endpoint; refresh grants never hit it anyway.
const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// The installed-app consent flow for one application identity
pub struct InstalledFlow {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
}

impl InstalledFlow {
    /// Build a flow from a parsed client-secret file
    pub fn new(secrets: &ClientSecrets) -> Result<Self> {
        let app = secrets.app()?;
        Ok(Self {
            client_id: app.client_id.clone(),
            client_secret: app.client_secret.clone(),
            auth_uri: app.auth_uri.clone(),
            token_uri: app.token_uri.clone(),
        })
    }

    /// Bind the callback listener and prepare the consent URL
    ///
    /// Fails if the port is already bound. The returned pending authorization
    /// carries the URL to show the user; call [`PendingAuthorization::finish`]
    /// to block until the redirect arrives.
    pub async fn begin(&self, port: u16) -> Result<PendingAuthorization> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await.map_err(|e| {
            Error::Auth(format!(
                "Failed to bind callback listener on port {port}: {e}"
            ))
        })?;
        let bound_port = listener
            .local_addr()
            .map_err(|e| Error::Auth(format!("Callback listener has no local address: {e}")))?
            .port();

        let redirect = RedirectUrl::new(format!("http://127.0.0.1:{bound_port}"))
            .map_err(|e| Error::Config(format!("Invalid redirect URI: {e}")))?;
        let client = oauth_client(
            &self.client_id,
            &self.client_secret,
            &self.auth_uri,
            &self.token_uri,
        )?
        .set_redirect_uri(redirect);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::debug!(port = bound_port, "callback listener bound");

        Ok(PendingAuthorization {
            client,
            listener,
            auth_url,
            csrf,
            pkce_verifier,
            token_uri: self.token_uri.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        })
    }
}

/// An in-flight consent flow waiting for the browser redirect
#[derive(Debug)]
pub struct PendingAuthorization {
    client: BasicClient,
    listener: TcpListener,
    auth_url: url::Url,
    csrf: CsrfToken,
    pkce_verifier: PkceCodeVerifier,
    token_uri: String,
    client_id: String,
    client_secret: String,
}

impl PendingAuthorization {
    /// The consent URL the user has to open in a browser
    pub fn authorize_url(&self) -> &url::Url {
        &self.auth_url
    }

    /// Block until the redirect arrives, then exchange the code for tokens
    pub async fn finish(self) -> Result<StoredCredentials> {
        let (code, state) = wait_for_redirect(&self.listener).await?;

        if state != *self.csrf.secret() {
            return Err(Error::Auth(
                "Authorization response state mismatch; aborting".into(),
            ));
        }

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(self.pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|e| Error::Auth(format!("Token exchange failed: {e}")))?;

        tracing::debug!("token exchange complete");

        Ok(credentials_from_token(
            &token,
            self.token_uri,
            self.client_id,
            self.client_secret,
            vec![DRIVE_SCOPE.to_string()],
        ))
    }
}

/// Mint a fresh access token from the stored refresh token
pub async fn refresh_access_token(creds: &StoredCredentials) -> Result<StoredCredentials> {
    let refresh = creds.refresh_token.clone().ok_or_else(|| {
        Error::Auth("Access token expired and no refresh token is stored; run `gdrive auth` again".into())
    })?;

    let client = oauth_client(
        &creds.client_id,
        &creds.client_secret,
        GOOGLE_AUTH_URI,
        &creds.token_uri,
    )?;

    let token = client
        .exchange_refresh_token(&RefreshToken::new(refresh.clone()))
        .request_async(async_http_client)
        .await
        .map_err(|e| Error::Auth(format!("Token refresh failed: {e}")))?;

    tracing::debug!("access token refreshed");

    let mut refreshed = credentials_from_token(
        &token,
        creds.token_uri.clone(),
        creds.client_id.clone(),
        creds.client_secret.clone(),
        creds.scopes.clone(),
    );
    // The refresh response usually omits the refresh token; keep the old one.
    if refreshed.refresh_token.is_none() {
        refreshed.refresh_token = Some(refresh);
    }
    Ok(refreshed)
}

fn oauth_client(
    client_id: &str,
    client_secret: &str,
    auth_uri: &str,
    token_uri: &str,
) -> Result<BasicClient> {
    let auth_url = AuthUrl::new(auth_uri.to_string())
        .map_err(|e| Error::Config(format!("Invalid auth URI: {e}")))?;
    let token_url = TokenUrl::new(token_uri.to_string())
        .map_err(|e| Error::Config(format!("Invalid token URI: {e}")))?;

    Ok(BasicClient::new(
        ClientId::new(client_id.to_string()),
        Some(ClientSecret::new(client_secret.to_string())),
        auth_url,
        Some(token_url),
    ))
}

fn credentials_from_token(
    token: &BasicTokenResponse,
    token_uri: String,
    client_id: String,
    client_secret: String,
    fallback_scopes: Vec<String>,
) -> StoredCredentials {
    let expiry = token
        .expires_in()
        .map(|d| Timestamp::now() + SignedDuration::from_secs(d.as_secs() as i64));

    let scopes = token
        .scopes()
        .map(|s| s.iter().map(|scope| scope.to_string()).collect())
        .unwrap_or(fallback_scopes);

    StoredCredentials::from_token_grant(
        token.access_token().secret().clone(),
        token.refresh_token().map(|t| t.secret().clone()),
        token_uri,
        client_id,
        client_secret,
        scopes,
        expiry,
    )
}

/// Accept connections until one carries an authorization response
///
/// Returns the `code` and `state` query parameters. A redirect carrying an
/// `error` parameter (user denied consent) is fatal. Anything else, such as a
/// favicon probe, gets a 404 and the listener keeps waiting.
async fn wait_for_redirect(listener: &TcpListener) -> Result<(String, String)> {
    loop {
        let (mut stream, peer) = listener
            .accept()
            .await
            .map_err(|e| Error::Auth(format!("Callback listener failed: {e}")))?;
        tracing::debug!(%peer, "callback connection accepted");

        let mut buf = vec![0u8; 4096];
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| Error::Auth(format!("Failed to read callback request: {e}")))?;
        let request = String::from_utf8_lossy(&buf[..n]);

        let Some(path) = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
        else {
            respond(&mut stream, 404, "Not found.").await;
            continue;
        };

        let Ok(redirect) = url::Url::parse(&format!("http://127.0.0.1{path}")) else {
            respond(&mut stream, 404, "Not found.").await;
            continue;
        };

        let mut code = None;
        let mut state = None;
        let mut denial = None;
        for (key, value) in redirect.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => denial = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(reason) = denial {
            respond(&mut stream, 200, "Authorization failed. You can close this window.").await;
            return Err(Error::Auth(format!("Authorization was denied: {reason}")));
        }

        match (code, state) {
            (Some(code), Some(state)) => {
                respond(&mut stream, 200, "Authorization complete. You can close this window.")
                    .await;
                return Ok((code, state));
            }
            _ => respond(&mut stream, 404, "Not found.").await,
        }
    }
}

async fn respond(stream: &mut TcpStream, status: u16, body: &str) {
    let reason = if status == 200 { "OK" } else { "Not Found" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    // The browser side is best-effort; the flow outcome does not depend on it.
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
