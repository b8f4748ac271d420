use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::info;

use sms_convert::chats::{group_by_contact, write_chats_file};
use sms_convert::constants::{LOG_DIR_ENV, PROGRESS_DONE, PROGRESS_READING, PROGRESS_WRITING};
use sms_convert::converter::convert_file;
use sms_convert::logging;
use sms_convert::sbr::write_sbr_file;
use sms_convert::types::TimeZoneMode;

#[derive(Parser)]
#[command(name = "sms_convert")]
#[command(about = "Convert an iOS SMS CSV dump into an SMS Backup & Restore XML file")]
#[command(version = "0.1.0")]
struct Cli {
    /// CSV export with rows of: address, sent flag, timestamp, body, service
    input: PathBuf,

    /// XML file to write; replaced if it exists
    output: PathBuf,

    /// Convert timestamps through UTC instead of the local time zone
    #[arg(long)]
    utc: bool,

    /// Also write the messages grouped by contact as CSV
    #[arg(long, value_name = "PATH")]
    chats_csv: Option<PathBuf>,
}

fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Usage errors exit with 1 rather than clap's default 2
            let _ = e.print();
            process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = parse_args();

    let log_dir = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from);
    let _guard = logging::init_logging(log_dir.as_deref());

    let mode = if cli.utc {
        TimeZoneMode::Utc
    } else {
        TimeZoneMode::Local
    };
    info!(input = %cli.input.display(), output = %cli.output.display(), ?mode, "Starting conversion");

    println!("{}", PROGRESS_READING);
    let (messages, report) = convert_file(&cli.input, mode)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    println!("{}", PROGRESS_WRITING);
    write_sbr_file(&cli.output, &messages)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    if let Some(chats_path) = &cli.chats_csv {
        let chats = group_by_contact(&messages);
        write_chats_file(chats_path, &chats, mode)
            .with_context(|| format!("Failed to write {}", chats_path.display()))?;
    }

    info!(
        converted = report.converted,
        skipped = report.skipped,
        "Finished"
    );
    println!("{}", PROGRESS_DONE);
    Ok(())
}
