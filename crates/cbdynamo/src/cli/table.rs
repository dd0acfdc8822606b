//! Table-level commands.

use clap::Parser;

/// Item count reported for the table.
#[derive(Debug, Parser)]
pub struct CountCommand {}

/// Count items by a secondary index value.
#[derive(Debug, Parser)]
pub struct CountColumnCommand {
    /// Index name or the attribute it is keyed on.
    pub index: String,
    /// Value to match.
    pub value: String,
}

/// Show the key schema.
#[derive(Debug, Parser)]
pub struct SchemaCommand {}

/// Show the secondary indexes.
#[derive(Debug, Parser)]
pub struct IndexesCommand {}

/// Delete every item.
#[derive(Debug, Parser)]
pub struct TruncateCommand {
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub force: bool,
}
