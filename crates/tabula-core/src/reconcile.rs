//! Outcome types for schema reconciliation.
//!
//! Reconciliation is best-effort: a failure on one table or column is recorded
//! here and never stops work on the others.

use std::fmt;

/// What happened to one table during a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
  /// The table did not exist and was created from the descriptor.
  Created,
  /// The table did not exist and `CREATE TABLE` failed.
  CreateFailed(String),
  /// The existence check or column listing failed; nothing was attempted.
  InspectFailed(String),
  /// The table existed; missing columns were added where possible.
  Reconciled {
    added:  Vec<String>,
    failed: Vec<ColumnFailure>,
  },
}

/// A column whose `ADD COLUMN` statement was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFailure {
  pub column: String,
  pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
  pub table:   String,
  pub outcome: TableOutcome,
}

impl TableReport {
  /// Number of `CREATE TABLE` and `ADD COLUMN` statements attempted.
  pub fn statements_issued(&self) -> usize {
    match &self.outcome {
      TableOutcome::Created | TableOutcome::CreateFailed(_) => 1,
      TableOutcome::InspectFailed(_) => 0,
      TableOutcome::Reconciled { added, failed } => added.len() + failed.len(),
    }
  }

  pub fn is_clean(&self) -> bool {
    match &self.outcome {
      TableOutcome::Created => true,
      TableOutcome::CreateFailed(_) | TableOutcome::InspectFailed(_) => false,
      TableOutcome::Reconciled { failed, .. } => failed.is_empty(),
    }
  }
}

/// The result of reconciling a set of descriptors, sorted by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
  pub tables: Vec<TableReport>,
}

impl ReconcileReport {
  pub fn new(mut tables: Vec<TableReport>) -> Self {
    tables.sort_by(|a, b| a.table.cmp(&b.table));
    Self { tables }
  }

  pub fn get(&self, table: &str) -> Option<&TableOutcome> {
    self
      .tables
      .iter()
      .find(|t| t.table == table)
      .map(|t| &t.outcome)
  }

  pub fn statements_issued(&self) -> usize {
    self.tables.iter().map(TableReport::statements_issued).sum()
  }

  pub fn is_clean(&self) -> bool { self.tables.iter().all(TableReport::is_clean) }
}

impl fmt::Display for TableReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.outcome {
      TableOutcome::Created => write!(f, "{}: created", self.table),
      TableOutcome::CreateFailed(e) => {
        write!(f, "{}: create failed ({e})", self.table)
      }
      TableOutcome::InspectFailed(e) => {
        write!(f, "{}: inspection failed ({e})", self.table)
      }
      TableOutcome::Reconciled { added, failed } if added.is_empty() && failed.is_empty() => {
        write!(f, "{}: up to date", self.table)
      }
      TableOutcome::Reconciled { added, failed } => {
        write!(f, "{}: added [{}]", self.table, added.join(", "))?;
        for ColumnFailure { column, reason } in failed {
          write!(f, "; {column} failed ({reason})")?;
        }
        Ok(())
      }
    }
  }
}

impl fmt::Display for ReconcileReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for table in &self.tables {
      writeln!(f, "{table}")?;
    }
    Ok(())
  }
}
