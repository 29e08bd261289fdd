use crate::cli::ShowArgs;
use crate::config::AppConfig;
use crate::error::Result;
use relion_star::core::error::StarError;
use relion_star::core::io::writer::{WriteOptions, write_block};
use relion_star::core::models::star_file::{BlockStyle, DataBlock};
use relion_star::core::models::table::{Table, TableError, normalize_label};
use std::io::Write;
use tracing::info;

pub fn run(args: ShowArgs, config: &AppConfig) -> Result<()> {
    let table = args.table.read(&config.parse)?;
    let view = project(&table, &args.columns, args.limit)?;
    if view.len() < table.len() {
        info!("Showing {} of {} rows.", view.len(), table.len());
    }

    let options = WriteOptions {
        header_comment: None,
        ..config.write.clone()
    };
    let block = DataBlock::new(
        args.table.block.clone().unwrap_or_default(),
        BlockStyle::Loop,
        view,
    );
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_block(&block, &mut out, &options)?;
    out.flush()?;
    Ok(())
}

/// Copies the selected columns (all when `labels` is empty) of the first
/// `limit` rows.
fn project(table: &Table, labels: &[String], limit: Option<usize>) -> Result<Table> {
    let labels: Vec<&str> = if labels.is_empty() {
        table.labels().collect()
    } else {
        labels.iter().map(|label| normalize_label(label)).collect()
    };
    let mut indices = Vec::with_capacity(labels.len());
    let mut columns = Vec::with_capacity(labels.len());
    for label in &labels {
        let index = table
            .column_index(label)
            .ok_or_else(|| StarError::from(TableError::ColumnNotFound(label.to_string())))?;
        indices.push(index);
        columns.push((*label, table.columns()[index].kind()));
    }

    let mut view = Table::with_columns(columns).map_err(StarError::from)?;
    for row in table.rows().take(limit.unwrap_or(usize::MAX)) {
        let values = indices.iter().map(|&i| row.values()[i].clone()).collect();
        view.add_row(values).map_err(StarError::from)?;
    }
    Ok(view)
}
