use std::io;

use clap::{Args, Subcommand};
use serde_json::json;
use sluice_search::{
    BulkSummary, DEFAULT_PAGE_SIZE, DeleteOutcome, DocIds, Documents, InsertOutcome, ScanOptions,
    get_client,
};

use crate::error_presentation::{CliError, CliResult};

const STDIN_MARKER: &str = "-";

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Cluster URL
    #[arg(long)]
    url: String,

    /// API key id; read from ELASTIC_API_ID when omitted
    #[arg(long)]
    api_id: Option<String>,

    /// API key secret; read from ELASTIC_API_KEY when omitted
    #[arg(long)]
    api_key: Option<String>,

    /// Connect without credentials
    #[arg(long)]
    no_creds: bool,

    #[command(subcommand)]
    action: SearchAction,
}

#[derive(Subcommand, Debug)]
enum SearchAction {
    /// Print every document of an index as NDJSON
    GetAll {
        index: String,
        /// Search `query` body as JSON
        #[arg(long, value_name = "JSON")]
        query: Option<String>,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Index a JSON object or an array of objects (`-` reads stdin)
    Insert { index: String, docs: String },
    /// Delete documents by id
    Delete {
        index: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub(crate) fn run_search(args: SearchArgs) -> CliResult<()> {
    let client = get_client(
        &args.url,
        args.api_id.as_deref(),
        args.api_key.as_deref(),
        args.no_creds,
    )?;

    match args.action {
        SearchAction::GetAll {
            index,
            query,
            page_size,
        } => {
            let options = ScanOptions {
                query: query
                    .as_deref()
                    .map(serde_json::from_str::<serde_json::Value>)
                    .transpose()?,
                page_size,
                ..ScanOptions::default()
            };
            for hit in client.get_all_with(&index, options) {
                let hit = hit?;
                let line = json!({"_index": hit.index, "_id": hit.id, "_source": hit.source});
                println!("{line}");
            }
        }
        SearchAction::Insert { index, docs } => {
            let raw = if docs == STDIN_MARKER {
                io::read_to_string(io::stdin()).map_err(CliError::ReadStdin)?
            } else {
                docs
            };
            let docs = Documents::try_from(serde_json::from_str::<serde_json::Value>(&raw)?)?;
            match client.insert(&index, docs)? {
                InsertOutcome::Indexed(written) => println!("{} {}", written.result, written.id),
                InsertOutcome::Bulk(summary) => report_bulk(&summary)?,
            }
        }
        SearchAction::Delete { index, mut ids } => {
            let ids = if ids.len() == 1 {
                DocIds::One(ids.remove(0))
            } else {
                DocIds::Many(ids)
            };
            match client.delete(&index, ids)? {
                DeleteOutcome::Deleted(written) => println!("{} {}", written.result, written.id),
                DeleteOutcome::Bulk(summary) => report_bulk(&summary)?,
            }
        }
    }

    Ok(())
}

fn report_bulk(summary: &BulkSummary) -> CliResult<()> {
    println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
    if summary.is_success() {
        return Ok(());
    }

    Err(CliError::BulkFailures {
        failed: summary.failed,
        succeeded: summary.succeeded,
    })
}
