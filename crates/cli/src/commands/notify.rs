use clap::Args;
use sluice_notify::{DEFAULT_API_BASE_URL, TextNotification};

use crate::error_presentation::CliResult;

#[derive(Args, Debug)]
pub(crate) struct NotifyArgs {
    /// Recipient phone number
    to: String,

    message: String,

    /// Messaging API host
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE_URL)]
    base_url: String,
}

pub(crate) fn run_notify(args: NotifyArgs) -> CliResult<()> {
    let sender = TextNotification::new()?.with_base_url(&args.base_url)?;
    let receipt = sender.send_notification(&args.to, &args.message)?;
    println!(
        "{} {} {}",
        receipt.sid,
        receipt.status,
        receipt.sent_at.to_rfc3339()
    );
    Ok(())
}
