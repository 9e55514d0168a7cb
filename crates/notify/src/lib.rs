mod error;
mod text;

pub use error::{Error, Result};
pub use text::{
    ACCOUNT_SID_ENV, AUTH_TOKEN_ENV, DEFAULT_API_BASE_URL, FROM_NUMBER, MessageReceipt,
    TextNotification, notification_timezone,
};
