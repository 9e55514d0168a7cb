use clap::{Parser, Subcommand};

mod commands;
mod error_presentation;
mod tracing_setup;

#[cfg(any(feature = "postgres", feature = "mssql"))]
use commands::ServerArgs;
#[cfg(feature = "sqlite")]
use commands::SqliteArgs;
use commands::{NotifyArgs, SearchArgs, run_database, run_notify, run_search};
use error_presentation::{CliResult, render_runtime_error};

#[derive(Parser, Debug)]
#[command(
    name = "sluice",
    version,
    about = "Load rows into SQL databases, manage search documents, and send text notifications"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// PostgreSQL database commands
    #[cfg(feature = "postgres")]
    Postgres(ServerArgs),
    /// SQLite database commands
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteArgs),
    /// SQL Server database commands
    #[cfg(feature = "mssql")]
    Mssql(ServerArgs),
    /// Search cluster document commands
    Search(SearchArgs),
    /// Send one text message
    Notify(NotifyArgs),
}

fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if let Err(error) = tracing_setup::init(cli.debug) {
        eprintln!("[logging] {error}");
    }

    if let Err(error) = run(cli.command) {
        let exit_code = error.exit_code();
        eprintln!("{}", render_runtime_error(error));
        std::process::exit(exit_code);
    }
}

fn run(command: Command) -> CliResult<()> {
    match command {
        #[cfg(feature = "postgres")]
        Command::Postgres(args) => {
            let (params, connect, action) = args.into_parts();
            run_database(
                sluice_dialect_postgres::PostgresDialect,
                params,
                &connect,
                action,
            )
        }
        #[cfg(feature = "sqlite")]
        Command::Sqlite(args) => {
            let (params, connect, action) = args.into_parts();
            run_database(sluice_dialect_sqlite::SqliteDialect, params, &connect, action)
        }
        #[cfg(feature = "mssql")]
        Command::Mssql(args) => {
            let (params, connect, action) = args.into_parts();
            run_database(sluice_dialect_mssql::MssqlDialect, params, &connect, action)
        }
        Command::Search(args) => run_search(args),
        Command::Notify(args) => run_notify(args),
    }
}
