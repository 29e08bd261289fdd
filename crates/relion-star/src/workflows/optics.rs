use super::error::WorkflowError;
use crate::core::models::star_file::StarFile;
use crate::core::models::table::{Table, normalize_label};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

pub const OPTICS_BLOCK: &str = "optics";
pub const OPTICS_GROUP_LABEL: &str = "rlnOpticsGroup";

/// Copies optics-group columns into every row of `data_block`.
///
/// Rows are matched to the `optics` block through `rlnOpticsGroup`. With an
/// empty `labels` slice every optics column is copied. Columns the data block
/// already has are kept as they are. The input file is not modified.
///
/// # Errors
///
/// * [`WorkflowError::Star`] if either block is missing.
/// * [`WorkflowError::Table`] if a requested label is not in the optics block
///   or a table lacks `rlnOpticsGroup`.
/// * [`WorkflowError::UnknownOpticsGroup`] if a row names an undefined group.
#[instrument(skip_all, name = "join_optics", fields(block = data_block))]
pub fn join_optics(
    star: &StarFile,
    data_block: &str,
    labels: &[&str],
) -> Result<Table, WorkflowError> {
    let optics = star.table(Some(OPTICS_BLOCK))?;
    let mut table = star.table(Some(data_block))?.clone();

    let wanted: Vec<String> = if labels.is_empty() {
        optics
            .labels()
            .filter(|label| *label != OPTICS_GROUP_LABEL)
            .map(str::to_string)
            .collect()
    } else {
        labels
            .iter()
            .map(|label| normalize_label(label).to_string())
            .collect()
    };
    for label in &wanted {
        optics.column_type(label)?;
    }

    let mut group_rows = HashMap::with_capacity(optics.len());
    for row in optics.rows() {
        group_rows.insert(row.get_int(OPTICS_GROUP_LABEL)?, row.index());
    }

    let source_rows = table
        .rows()
        .map(|row| -> Result<usize, WorkflowError> {
            let group = row.get_int(OPTICS_GROUP_LABEL)?;
            group_rows
                .get(&group)
                .copied()
                .ok_or(WorkflowError::UnknownOpticsGroup {
                    row: row.index(),
                    group,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut copied = 0;
    for label in wanted {
        if table.has_column(&label) {
            debug!("Column '{}' already present in '{}'; skipping.", label, data_block);
            continue;
        }
        let kind = optics.column_type(&label)?;
        let values = source_rows
            .iter()
            .map(|&index| optics.value(index, &label).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        table.add_column_typed(label, kind, values)?;
        copied += 1;
    }

    info!(
        "Copied {} optics column(s) into {} row(s) of '{}'.",
        copied,
        table.len(),
        data_block
    );
    Ok(table)
}
