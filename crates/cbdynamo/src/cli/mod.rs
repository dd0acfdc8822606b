//! CLI command definitions.

pub mod items;
pub mod table;

use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

/// Helpers for a single DynamoDB table.
#[derive(Debug, Parser)]
#[command(name = "cbdynamo")]
#[command(about = "Helpers for a single DynamoDB table", long_about = None)]
pub struct Cli {
    /// Table to operate on.
    #[arg(long, global = true, env = "DYNAMODB_TABLE_NAME")]
    pub table: Option<String>,

    /// Country index searches are scoped to.
    #[arg(long, global = true, env = "CBDYNAMO_COUNTRY")]
    pub country: Option<String>,

    /// AWS region.
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom endpoint URL (e.g., http://localhost:8000 for local DynamoDB).
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Log line format.
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Suppress non-essential output.
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output with colors.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Format and write a message.
    Put(items::PutCommand),
    /// Write an item as given, without formatting.
    PutItem(items::PutItemCommand),
    /// Read one item.
    Get(items::GetCommand),
    /// Read every item of a table.
    Scan(items::ScanCommand),
    /// Find items by a secondary index value.
    Search(items::SearchCommand),
    /// Read one attribute of every item.
    Column(items::ColumnCommand),
    /// Write every record of an upload file.
    Upload(items::UploadCommand),
    /// Item count reported for a table.
    Count(table::CountCommand),
    /// Count items by a secondary index value.
    CountColumn(table::CountColumnCommand),
    /// Show the table key schema.
    Schema(table::SchemaCommand),
    /// Show the table secondary indexes.
    Indexes(table::IndexesCommand),
    /// Delete every item of the table.
    Truncate(table::TruncateCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from([
            "cbdynamo",
            "--table",
            "messages_staging",
            "search",
            "school_id",
            "42",
            "--format",
            "json",
        ]);

        assert_eq!(cli.table.as_deref(), Some("messages_staging"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Search(cmd) => {
                assert_eq!(cmd.index, "school_id");
                assert_eq!(cmd.value, "42");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_truncate_force() {
        let cli = Cli::parse_from(["cbdynamo", "truncate", "--force"]);
        assert!(matches!(cli.command, Commands::Truncate(cmd) if cmd.force));
    }
}
