//! Additive schema reconciliation.
//!
//! For every [`TableDescriptor`] the table is created if it is missing;
//! otherwise each described column that the live table lacks is added with
//! `ALTER TABLE ... ADD COLUMN`. Nothing is ever dropped or altered, so
//! running the same descriptors twice issues no statements the second time.

use tabula_core::{
  descriptor::TableDescriptor,
  reconcile::{ColumnFailure, ReconcileReport, TableOutcome, TableReport},
};
use tokio::task::JoinSet;

use crate::SqliteStore;

impl SqliteStore {
  /// Reconcile every descriptor against the database.
  ///
  /// Each table is handled by its own task and completes independently of the
  /// others. Failures are logged and recorded in the report; they never abort
  /// the run.
  pub async fn reconcile(&self, descriptors: &[TableDescriptor]) -> ReconcileReport {
    let mut tasks = JoinSet::new();
    for descriptor in descriptors.iter().cloned() {
      let store = self.clone();
      tasks.spawn(async move { store.reconcile_table(&descriptor).await });
    }

    let mut tables = Vec::with_capacity(descriptors.len());
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok(report) => tables.push(report),
        Err(e) => tracing::error!(error = %e, "reconciliation task did not complete"),
      }
    }

    ReconcileReport::new(tables)
  }

  /// Bring one table up to date with its descriptor.
  async fn reconcile_table(&self, descriptor: &TableDescriptor) -> TableReport {
    let table = descriptor.name.clone();
    let outcome = self.reconcile_outcome(descriptor).await;
    TableReport { table, outcome }
  }

  async fn reconcile_outcome(&self, descriptor: &TableDescriptor) -> TableOutcome {
    let table = descriptor.name.as_str();

    let exists = match self.table_exists(table).await {
      Ok(exists) => exists,
      Err(e) => {
        tracing::error!(table, error = %e, "failed to check whether table exists");
        return TableOutcome::InspectFailed(e.to_string());
      }
    };

    if !exists {
      return match self.execute_ddl(descriptor.create_statement()).await {
        Ok(()) => {
          tracing::info!(table, "table created");
          TableOutcome::Created
        }
        Err(e) => {
          tracing::error!(table, error = %e, "failed to create table");
          TableOutcome::CreateFailed(e.to_string())
        }
      };
    }

    let existing = match self.column_names(table).await {
      Ok(names) => names,
      Err(e) => {
        tracing::error!(table, error = %e, "failed to list existing columns");
        return TableOutcome::InspectFailed(e.to_string());
      }
    };

    let mut added = Vec::new();
    let mut failed = Vec::new();
    for column in &descriptor.columns {
      let name = column.column_name();
      if existing.contains(&name) {
        continue;
      }

      match self.execute_ddl(descriptor.add_column_statement(column)).await {
        Ok(()) => {
          tracing::info!(table, column = %name, "column added");
          added.push(name);
        }
        Err(e) => {
          tracing::warn!(table, column = %name, error = %e, "failed to add column");
          failed.push(ColumnFailure {
            column: name,
            reason: e.to_string(),
          });
        }
      }
    }

    if added.is_empty() && failed.is_empty() {
      tracing::debug!(table, "table up to date");
    }
    TableOutcome::Reconciled { added, failed }
  }
}
