//! Integration tests for `SqliteStore` against an in-memory database.

use serde_json::{json, Value};
use tabula_core::{
  descriptor::{ColumnDescriptor, TableDescriptor},
  entity::{fields_from_value, Record, RecordId, POSTS, USERS},
  reconcile::TableOutcome,
  store::EntityStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn table(name: &str, columns: Vec<ColumnDescriptor>) -> TableDescriptor {
  TableDescriptor::new(name, columns).expect("valid descriptor")
}

fn users_descriptor() -> TableDescriptor {
  table(
    "users",
    vec![
      ColumnDescriptor::new("id", "INTEGER").primary(),
      ColumnDescriptor::new("username", "TEXT").unique(),
      ColumnDescriptor::new("email", "TEXT"),
      ColumnDescriptor::new("password", "TEXT"),
    ],
  )
}

fn posts_descriptor() -> TableDescriptor {
  table(
    "posts",
    vec![
      ColumnDescriptor::new("id", "INTEGER").primary(),
      ColumnDescriptor::new("title", "TEXT"),
      ColumnDescriptor::new("body", "TEXT"),
    ],
  )
}

async fn store_with_schema() -> SqliteStore {
  let s = store().await;
  let report = s.reconcile(&[users_descriptor(), posts_descriptor()]).await;
  assert!(report.is_clean(), "{report}");
  s
}

fn fields(value: Value) -> Record { fields_from_value(value).unwrap() }

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn creates_missing_tables() {
  let s = store().await;
  let report = s.reconcile(&[users_descriptor(), posts_descriptor()]).await;

  assert_eq!(report.get("users"), Some(&TableOutcome::Created));
  assert_eq!(report.get("posts"), Some(&TableOutcome::Created));
  assert!(s.table_exists("users").await.unwrap());
  assert_eq!(
    s.column_names("posts").await.unwrap(),
    ["id", "title", "body"]
  );
}

#[tokio::test]
async fn second_run_issues_no_statements() {
  let s = store().await;
  let descriptors = [users_descriptor(), posts_descriptor()];

  let first = s.reconcile(&descriptors).await;
  assert_eq!(first.statements_issued(), 2);

  let second = s.reconcile(&descriptors).await;
  assert_eq!(second.statements_issued(), 0);
  assert!(second.is_clean());
  for report in &second.tables {
    assert_eq!(
      report.outcome,
      TableOutcome::Reconciled { added: vec![], failed: vec![] }
    );
  }
  assert_eq!(
    s.column_names("users").await.unwrap(),
    ["id", "username", "email", "password"]
  );
}

#[tokio::test]
async fn adds_missing_columns_without_dropping_others() {
  let s = store().await;
  s.reconcile(&[table(
    "items",
    vec![ColumnDescriptor::new("a", "TEXT"), ColumnDescriptor::new("b", "TEXT")],
  )])
  .await;

  let report = s
    .reconcile(&[table(
      "items",
      vec![ColumnDescriptor::new("a", "TEXT"), ColumnDescriptor::new("c", "INTEGER")],
    )])
    .await;

  assert_eq!(
    report.get("items"),
    Some(&TableOutcome::Reconciled {
      added:  vec!["c".into()],
      failed: vec![],
    })
  );
  assert_eq!(s.column_names("items").await.unwrap(), ["a", "b", "c"]);
}

#[tokio::test]
async fn existing_column_match_ignores_case() {
  let s = store().await;
  s.reconcile(&[table("contacts", vec![ColumnDescriptor::new("email", "TEXT")])])
    .await;

  let report = s
    .reconcile(&[table("contacts", vec![ColumnDescriptor::new("Email", "TEXT")])])
    .await;

  assert_eq!(report.statements_issued(), 0);
  assert_eq!(s.column_names("contacts").await.unwrap(), ["email"]);
}

#[tokio::test]
async fn column_names_are_stored_lower_case() {
  let s = store().await;
  s.reconcile(&[table("people", vec![ColumnDescriptor::new("FullName", "TEXT")])])
    .await;
  s.reconcile(&[table(
    "people",
    vec![
      ColumnDescriptor::new("FullName", "TEXT"),
      ColumnDescriptor::new("NickName", "TEXT"),
    ],
  )])
  .await;

  assert_eq!(
    s.column_names("people").await.unwrap(),
    ["fullname", "nickname"]
  );
}

#[tokio::test]
async fn rejected_column_does_not_block_the_rest() {
  let s = store().await;
  s.reconcile(&[table("profiles", vec![ColumnDescriptor::new("name", "TEXT")])])
    .await;

  // SQLite refuses to add PRIMARY KEY or UNIQUE columns to an existing table.
  let report = s
    .reconcile(&[table(
      "profiles",
      vec![
        ColumnDescriptor::new("name", "TEXT"),
        ColumnDescriptor::new("bio", "TEXT"),
        ColumnDescriptor::new("id", "INTEGER").primary(),
        ColumnDescriptor::new("handle", "TEXT").unique(),
        ColumnDescriptor::new("age", "INTEGER"),
      ],
    )])
    .await;

  let Some(TableOutcome::Reconciled { added, failed }) = report.get("profiles") else {
    panic!("unexpected report: {report:?}");
  };
  assert_eq!(added, &["bio", "age"]);
  let failed: Vec<_> = failed.iter().map(|f| f.column.as_str()).collect();
  assert_eq!(failed, ["id", "handle"]);
  assert!(!report.is_clean());
  assert_eq!(
    s.column_names("profiles").await.unwrap(),
    ["name", "bio", "age"]
  );

  // The partially migrated table can be reconciled again.
  let again = s
    .reconcile(&[table("profiles", vec![ColumnDescriptor::new("bio", "TEXT")])])
    .await;
  assert_eq!(again.statements_issued(), 0);
}

#[tokio::test]
async fn failed_create_does_not_stop_other_tables() {
  let s = store().await;
  let broken = table(
    "broken",
    vec![
      ColumnDescriptor::new("a", "INTEGER").primary(),
      ColumnDescriptor::new("b", "INTEGER").primary(),
    ],
  );

  let report = s.reconcile(&[broken, posts_descriptor()]).await;

  assert!(matches!(report.get("broken"), Some(TableOutcome::CreateFailed(_))));
  assert_eq!(report.get("posts"), Some(&TableOutcome::Created));
  assert!(!s.table_exists("broken").await.unwrap());
}

#[tokio::test]
async fn table_existence_check_is_case_sensitive() {
  let s = store_with_schema().await;

  // `Users` is not found by name, so a create is attempted, which SQLite
  // rejects because table names collide case-insensitively.
  let report = s
    .reconcile(&[table("Users", vec![ColumnDescriptor::new("id", "INTEGER")])])
    .await;

  assert!(matches!(report.get("Users"), Some(TableOutcome::CreateFailed(_))));
}

#[tokio::test]
async fn added_columns_appear_in_records() {
  let s = store_with_schema().await;
  s.create(&POSTS, &fields(json!({"title": "t", "body": "b"})))
    .await
    .unwrap();

  let mut extended = posts_descriptor();
  extended.columns.push(ColumnDescriptor::new("published", "INTEGER"));
  s.reconcile(&[extended]).await;

  let posts = s.list_all(&POSTS).await.unwrap();
  assert_eq!(posts[0].get("published"), Some(&Value::Null));
}

#[tokio::test]
async fn schema_statements_never_run_trailing_sql() {
  let s = store_with_schema().await;

  // Built directly so that the type check in `TableDescriptor::new` does not
  // stop these first.
  let smuggled_create = TableDescriptor {
    name:    "evil".into(),
    columns: vec![ColumnDescriptor::new("a", "TEXT); DROP TABLE posts; SELECT (1")],
  };
  let mut smuggled_add = posts_descriptor();
  smuggled_add
    .columns
    .push(ColumnDescriptor::new("extra", "TEXT; DROP TABLE users"));

  s.reconcile(&[smuggled_create]).await;
  s.reconcile(&[smuggled_add]).await;

  assert!(s.table_exists("posts").await.unwrap());
  assert!(s.table_exists("users").await.unwrap());
}

// ─── Entity store ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_by_id() {
  let s = store_with_schema().await;

  let id = s
    .create(
      &USERS,
      &fields(json!({"username": "alice", "email": "a@example.com", "password": "pw"})),
    )
    .await
    .unwrap();

  let user = s.get_by_id(&USERS, id).await.unwrap().unwrap();
  assert_eq!(user.get("id"), Some(&json!(id.get())));
  assert_eq!(user.get("username"), Some(&json!("alice")));
  assert_eq!(user.get("email"), Some(&json!("a@example.com")));
  assert_eq!(user.get("password"), Some(&json!("pw")));
}

#[tokio::test]
async fn records_keep_table_column_order() {
  let s = store_with_schema().await;
  let id = s
    .create(
      &USERS,
      &fields(json!({"password": "pw", "email": "a@example.com", "username": "alice"})),
    )
    .await
    .unwrap();

  let user = s.get_by_id(&USERS, id).await.unwrap().unwrap();
  let keys: Vec<&str> = user.keys().map(String::as_str).collect();
  assert_eq!(keys, ["id", "username", "email", "password"]);

  let users = s.list_all(&USERS).await.unwrap();
  let keys: Vec<&str> = users[0].keys().map(String::as_str).collect();
  assert_eq!(keys, ["id", "username", "email", "password"]);
}

#[tokio::test]
async fn missing_fields_are_stored_as_null() {
  let s = store_with_schema().await;

  let id = s
    .create(&POSTS, &fields(json!({"title": "only a title", "extra": 1})))
    .await
    .unwrap();

  let post = s.get_by_id(&POSTS, id).await.unwrap().unwrap();
  assert_eq!(post.get("body"), Some(&Value::Null));
  assert!(post.get("extra").is_none());
}

#[tokio::test]
async fn list_all_returns_every_record() {
  let s = store_with_schema().await;
  assert!(s.list_all(&POSTS).await.unwrap().is_empty());

  for title in ["one", "two", "three"] {
    s.create(&POSTS, &fields(json!({"title": title, "body": "..."})))
      .await
      .unwrap();
  }

  let posts = s.list_all(&POSTS).await.unwrap();
  let titles: Vec<_> = posts.iter().map(|p| p["title"].clone()).collect();
  assert_eq!(titles, [json!("one"), json!("two"), json!("three")]);
}

#[tokio::test]
async fn update_is_reflected_by_get() {
  let s = store_with_schema().await;
  let id = s
    .create(&POSTS, &fields(json!({"title": "draft", "body": "wip"})))
    .await
    .unwrap();

  let updated = s
    .update_by_id(&POSTS, id, &fields(json!({"title": "final", "body": "done"})))
    .await
    .unwrap();
  assert!(updated);

  let post = s.get_by_id(&POSTS, id).await.unwrap().unwrap();
  assert_eq!(post["title"], json!("final"));
  assert_eq!(post["body"], json!("done"));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
  let s = store_with_schema().await;
  let id = s
    .create(&USERS, &fields(json!({"username": "bob"})))
    .await
    .unwrap();

  assert!(s.delete_by_id(&USERS, id).await.unwrap());
  assert!(s.get_by_id(&USERS, id).await.unwrap().is_none());
  assert!(!s.delete_by_id(&USERS, id).await.unwrap());
}

#[tokio::test]
async fn writes_to_missing_ids_are_not_errors() {
  let s = store_with_schema().await;
  let missing = RecordId(404);

  assert!(s.get_by_id(&USERS, missing).await.unwrap().is_none());
  assert!(!s.delete_by_id(&USERS, missing).await.unwrap());
  assert!(
    !s.update_by_id(&USERS, missing, &fields(json!({"username": "ghost"})))
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn constraint_violation_is_a_storage_error() {
  let s = store_with_schema().await;
  s.create(&USERS, &fields(json!({"username": "carol"})))
    .await
    .unwrap();

  let err = s
    .create(&USERS, &fields(json!({"username": "carol"})))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn missing_table_is_a_storage_error() {
  let s = store().await;
  assert!(s.list_all(&USERS).await.is_err());
}

#[tokio::test]
async fn values_are_coerced_to_storage_classes() {
  let s = store_with_schema().await;
  let id = s
    .create(
      &POSTS,
      &fields(json!({"title": true, "body": {"blocks": [1, 2]}})),
    )
    .await
    .unwrap();

  let post = s.get_by_id(&POSTS, id).await.unwrap().unwrap();
  // Column affinity is TEXT, so the integer 1 is stored as text.
  assert_eq!(post["title"], json!("1"));
  assert_eq!(post["body"], json!(r#"{"blocks":[1,2]}"#));
}
