//! cbdynamo CLI entry point.

use anstream::println as aprintln;
use anyhow::Context;
use cbdynamo::cli::{Cli, Commands, OutputFormat};
use cbdynamo::config::{Config, Secrets};
use cbdynamo::logging;
use cbdynamo::output::{format_output, pretty};
use cbdynamo::storage::DynamoDbStore;
use cbdynamo::{PostOptions, Table};
use cbdynamo_core::storage::TableStore;
use clap::Parser;
use dialoguer::Confirm;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(table) = &cli.table {
        config.table_name = table.clone();
    }
    if let Some(region) = &cli.region {
        config.region = region.clone();
    }
    if cli.endpoint_url.is_some() {
        config.endpoint_url = cli.endpoint_url.clone();
    }
    if cli.country.is_some() {
        config.country = cli.country.clone();
    }

    let loaded = Secrets::load_optional(&config.secrets_path).with_context(|| {
        format!(
            "failed to load secrets from {}",
            config.secrets_path.display()
        )
    })?;
    let secrets_found = loaded.is_some();
    let secrets = loaded.unwrap_or_default();
    logging::init(secrets.log_level().as_deref(), cli.log_format);

    if !secrets_found {
        tracing::debug!(
            path = %config.secrets_path.display(),
            "No secrets file, using defaults"
        );
    }

    tracing::debug!(
        environment = secrets.environment(),
        target = %config.target_display(),
        table_name = %config.table_name,
        "Configuration loaded"
    );

    let store = DynamoDbStore::from_config(&config).await;
    let mut table = Table::new(store, config.table_name.clone());
    if let Some(country) = &config.country {
        table = table.with_country(country);
    }

    run(&cli, &table).await
}

async fn run<S: TableStore>(cli: &Cli, table: &Table<S>) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Put(cmd) => {
            let mut options = PostOptions::default();
            if let Some(timestamp) = &cmd.timestamp {
                options = options.with_timestamp(timestamp);
            }
            if cmd.no_message_id {
                options = options.without_message_id();
            }
            let message_id = table.post_message(&cmd.data, options).await?;
            match cli.format {
                OutputFormat::Json => aprintln!(
                    "{}",
                    format_output(&serde_json::json!({ "message_id": message_id }), cli.format)
                ),
                OutputFormat::Pretty => {
                    if !cli.quiet {
                        aprintln!("{} {}", pretty::green("Saved message"), message_id);
                    }
                }
            }
        }
        Commands::PutItem(cmd) => {
            table.post_item(&cmd.data).await?;
            if !cli.quiet {
                aprintln!("{}", pretty::green("Item saved"));
            }
        }
        Commands::Get(cmd) => match table.get_item(None, cmd.key.clone()).await? {
            Some(record) => match cli.format {
                OutputFormat::Json => aprintln!("{}", format_output(&record, cli.format)),
                OutputFormat::Pretty => aprintln!("{}", pretty::format_record(&record)),
            },
            None => {
                if !cli.quiet {
                    aprintln!("{}", pretty::yellow("Item not found"));
                }
            }
        },
        Commands::Scan(_) => {
            let records = table.get_all_messages(None).await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", format_output(&records, cli.format)),
                OutputFormat::Pretty => aprintln!("{}", pretty::format_records(&records)),
            }
        }
        Commands::Search(cmd) => {
            let records = table.search_on_index(&cmd.index, &cmd.value).await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", format_output(&records, cli.format)),
                OutputFormat::Pretty => aprintln!("{}", pretty::format_records(&records)),
            }
        }
        Commands::Column(cmd) => {
            let records = table
                .get_column(None, &cmd.attribute, &cmd.filter_record())
                .await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", format_output(&records, cli.format)),
                OutputFormat::Pretty => aprintln!("{}", pretty::format_records(&records)),
            }
        }
        Commands::Upload(cmd) => {
            let contents = tokio::fs::read_to_string(&cmd.path)
                .await
                .with_context(|| format!("failed to read {}", cmd.path.display()))?;
            let payload: serde_json::Value = serde_json::from_str(&contents)
                .with_context(|| format!("{} is not valid JSON", cmd.path.display()))?;
            let summary = table
                .upload_table(&payload, cmd.timestamp.as_deref())
                .await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", format_output(&summary, cli.format)),
                OutputFormat::Pretty => aprintln!("{}", pretty::green(&summary.to_string())),
            }
        }
        Commands::Count(_) => {
            let count = table.get_index_count(None).await?;
            match cli.format {
                OutputFormat::Json => aprintln!(
                    "{}",
                    format_output(&serde_json::json!({ "item_count": count }), cli.format)
                ),
                OutputFormat::Pretty => aprintln!("{count}"),
            }
        }
        Commands::CountColumn(cmd) => {
            let count = table.get_column_count(&cmd.index, &cmd.value).await?;
            match cli.format {
                OutputFormat::Json => aprintln!(
                    "{}",
                    format_output(&serde_json::json!({ "count": count }), cli.format)
                ),
                OutputFormat::Pretty => aprintln!("{count}"),
            }
        }
        Commands::Schema(_) => {
            let key_schema = table.get_index_key_schema(None).await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", format_output(&key_schema, cli.format)),
                OutputFormat::Pretty => aprintln!(
                    "{}\n{}",
                    pretty::blue(table.table_name()),
                    pretty::format_key_schema(&key_schema)
                ),
            }
        }
        Commands::Indexes(_) => {
            let indexes = table.get_index_secondary_indexes(None).await?;
            match cli.format {
                OutputFormat::Json => aprintln!("{}", format_output(&indexes, cli.format)),
                OutputFormat::Pretty => aprintln!("{}", pretty::format_indexes(&indexes)),
            }
        }
        Commands::Truncate(cmd) => {
            if !cmd.force {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Delete every item of {}? ALL DATA WILL BE LOST",
                        table.table_name()
                    ))
                    .default(false)
                    .interact()
                    .context("failed to read confirmation")?;

                if !confirmed {
                    if !cli.quiet {
                        aprintln!("{}", pretty::yellow("Aborted."));
                    }
                    return Ok(());
                }
            }

            let deleted = table.truncate_table().await?;
            match cli.format {
                OutputFormat::Json => aprintln!(
                    "{}",
                    format_output(&serde_json::json!({ "deleted": deleted }), cli.format)
                ),
                OutputFormat::Pretty => {
                    aprintln!("{} {deleted} items", pretty::green("Deleted"))
                }
            }
        }
    }

    Ok(())
}
