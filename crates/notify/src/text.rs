use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

pub const ACCOUNT_SID_ENV: &str = "TWILIO_ACCOUNT_SID";
pub const AUTH_TOKEN_ENV: &str = "TWILIO_AUTH_TOKEN";
pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";
/// Sender number for every message.
pub const FROM_NUMBER: &str = "+14158497908";

const API_VERSION: &str = "2010-04-01";

/// Zone used for receipt timestamps.
#[must_use]
pub fn notification_timezone() -> Tz {
    chrono_tz::US::Eastern
}

/// What the provider reported for one accepted message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReceipt {
    pub sid: String,
    pub status: String,
    pub to: String,
    pub sent_at: DateTime<Tz>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    status: String,
    to: String,
}

/// SMS sender with a fixed sender number and timezone.
pub struct TextNotification {
    http: Client,
    base_url: Url,
    account_sid: String,
    auth_token: String,
    timezone: Tz,
}

impl fmt::Debug for TextNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNotification")
            .field("base_url", &self.base_url.as_str())
            .field("account_sid", &self.account_sid)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl TextNotification {
    /// Reads the account credentials from the process environment.
    pub fn new() -> Result<Self> {
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let account_sid = lookup(ACCOUNT_SID_ENV)
            .ok_or_else(|| Error::Config(format!("{ACCOUNT_SID_ENV} is not set")))?;
        let auth_token = lookup(AUTH_TOKEN_ENV)
            .ok_or_else(|| Error::Config(format!("{AUTH_TOKEN_ENV} is not set")))?;
        Self::with_credentials(account_sid, auth_token)
    }

    pub fn with_credentials(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(DEFAULT_API_BASE_URL)
            .map_err(|error| Error::Config(format!("invalid base url: {error}")))?;

        Ok(Self {
            http: Client::builder().build()?,
            base_url,
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            timezone: notification_timezone(),
        })
    }

    /// Points the sender at another API host.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)
            .map_err(|error| Error::Config(format!("invalid base url `{base_url}`: {error}")))?;
        Ok(self)
    }

    #[must_use]
    pub fn from_number(&self) -> &str {
        FROM_NUMBER
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn messages_url(&self) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::Config(format!("url `{}` cannot carry a request path", self.base_url))
            })?;
            path.pop_if_empty().extend([
                API_VERSION,
                "Accounts",
                self.account_sid.as_str(),
                "Messages.json",
            ]);
        }
        Ok(url)
    }

    /// Sends `message` to `to` once. Numbers and bodies go to the provider
    /// unchecked.
    pub fn send_notification(&self, to: &str, message: &str) -> Result<MessageReceipt> {
        let url = self.messages_url()?;
        debug!(to, from = FROM_NUMBER, "sending text notification");

        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", FROM_NUMBER), ("To", to), ("Body", message)])
            .send()?;
        let sent_at = Utc::now().with_timezone(&self.timezone);
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessageResponse = serde_json::from_str(&body)?;
        info!(sid = %message.sid, status = %message.status, "text notification accepted");

        Ok(MessageReceipt {
            sid: message.sid,
            status: message.status,
            to: message.to,
            sent_at,
        })
    }
}
