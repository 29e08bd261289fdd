use super::error::WorkflowError;
use crate::core::models::table::Table;
use crate::core::models::value::{ColumnType, Value};
use tracing::{info, instrument};

pub const DEFOCUS_U_LABEL: &str = "rlnDefocusU";
pub const DEFOCUS_V_LABEL: &str = "rlnDefocusV";
pub const GROUP_NUMBER_LABEL: &str = "rlnGroupNumber";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefocusGroupConfig {
    /// Largest defocus span (Å) a group may cover once it is large enough.
    pub max_range: f64,
    /// Smallest number of particles in a group.
    pub min_particles: usize,
}

impl Default for DefocusGroupConfig {
    fn default() -> Self {
        Self {
            max_range: 1000.0,
            min_particles: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefocusGroup {
    /// 1-based group number, ascending with defocus.
    pub number: usize,
    pub count: usize,
    pub min_defocus: f64,
    pub max_defocus: f64,
}

impl DefocusGroup {
    fn start(number: usize, defocus: f64) -> Self {
        Self {
            number,
            count: 1,
            min_defocus: defocus,
            max_defocus: defocus,
        }
    }

    fn absorb(&mut self, other: &DefocusGroup) {
        self.count += other.count;
        self.min_defocus = self.min_defocus.min(other.min_defocus);
        self.max_defocus = self.max_defocus.max(other.max_defocus);
    }
}

fn validate(config: &DefocusGroupConfig) -> Result<(), WorkflowError> {
    if !(config.max_range.is_finite() && config.max_range > 0.0) {
        return Err(WorkflowError::InvalidParameter {
            name: "max_range",
            reason: format!("must be a positive number, got {}", config.max_range),
        });
    }
    if config.min_particles == 0 {
        return Err(WorkflowError::InvalidParameter {
            name: "min_particles",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Mean of `rlnDefocusU` and `rlnDefocusV`, or `rlnDefocusU` alone.
fn mean_defocus(table: &Table) -> Result<Vec<f64>, WorkflowError> {
    let has_v = table.has_column(DEFOCUS_V_LABEL);
    table
        .rows()
        .map(|row| -> Result<f64, WorkflowError> {
            let u = row.get_float(DEFOCUS_U_LABEL)?;
            let d = if has_v {
                (u + row.get_float(DEFOCUS_V_LABEL)?) / 2.0
            } else {
                u
            };
            if !d.is_finite() {
                return Err(WorkflowError::InvalidValue {
                    row: row.index(),
                    label: DEFOCUS_U_LABEL.to_string(),
                });
            }
            Ok(d)
        })
        .collect()
}

/// Splits particles into defocus groups and records them in `rlnGroupNumber`.
///
/// Particles are visited in order of mean defocus. A particle joins the
/// current group while the group is below `min_particles` or while it stays
/// within `max_range` of the group's lowest defocus; otherwise it opens a new
/// group. A trailing group smaller than `min_particles` is merged into the one
/// before it. Row order is unchanged and an existing `rlnGroupNumber` column is
/// replaced.
#[instrument(skip_all, name = "defocus_groups", fields(rows = table.len()))]
pub fn assign_defocus_groups(
    table: &mut Table,
    config: &DefocusGroupConfig,
) -> Result<Vec<DefocusGroup>, WorkflowError> {
    validate(config)?;
    if table.is_empty() {
        return Err(WorkflowError::EmptyInput("particles".to_string()));
    }

    let defocus = mean_defocus(table)?;
    let mut order: Vec<usize> = (0..defocus.len()).collect();
    order.sort_by(|&a, &b| defocus[a].total_cmp(&defocus[b]));

    let mut groups: Vec<DefocusGroup> = Vec::new();
    let mut membership = vec![0usize; defocus.len()];
    for &row in &order {
        let d = defocus[row];
        match groups.last_mut() {
            Some(group)
                if group.count < config.min_particles
                    || d - group.min_defocus <= config.max_range =>
            {
                group.count += 1;
                group.max_defocus = d;
            }
            _ => groups.push(DefocusGroup::start(groups.len() + 1, d)),
        }
        membership[row] = groups.len();
    }

    let short_tail = groups.len() > 1
        && groups
            .last()
            .is_some_and(|group| group.count < config.min_particles);
    if short_tail {
        if let Some(tail) = groups.pop() {
            let merged_into = groups.len();
            if let Some(previous) = groups.last_mut() {
                previous.absorb(&tail);
            }
            for number in membership.iter_mut() {
                if *number == tail.number {
                    *number = merged_into;
                }
            }
        }
    }

    if table.has_column(GROUP_NUMBER_LABEL) {
        table.remove_column(GROUP_NUMBER_LABEL)?;
    }
    let values = membership
        .into_iter()
        .map(|n| Value::Int(n as i64))
        .collect();
    table.add_column_typed(GROUP_NUMBER_LABEL, ColumnType::Int, values)?;

    info!(
        "Assigned {} particles to {} defocus group(s).",
        table.len(),
        groups.len()
    );
    Ok(groups)
}
