//! Deployment pipeline integration tests
//!
//! Exercises the full decode → snapshot → index → normalize → report pass
//! against a real (temporary) SQLite database.

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

mod common;

use cfgsrv::config::ImportSection;
use cfgsrv::deploy::{run_deployment, snapshot};
use cfgsrv::error::CfgSrvError;
use common::{TestEnv, FULL_DOCUMENT, SAMPLE_DOCUMENT};

fn lenient() -> ImportSection {
    ImportSection::default()
}

#[tokio::test]
async fn worked_example_counts_and_resolution() {
    let env = TestEnv::create().await.unwrap();

    let report = run_deployment(env.pool(), SAMPLE_DOCUMENT, &lenient())
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.io_ports, 1);
    assert_eq!(report.devices, 1);
    assert_eq!(report.tags, 1);
    assert_eq!(report.calculation_tags, 1);
    assert_eq!(report.stats_tags, 0);
    assert_eq!(report.bridges, 0);
    assert_eq!(report.blocks, 0);
    assert!(report.warnings.is_empty());

    // The calculation tag's operand a resolved to the declared tag id.
    let a_tag_id: Option<String> =
        sqlx::query_scalar("SELECT a_tag_id FROM calculation_tags WHERE id = 'c1'")
            .fetch_one(env.pool())
            .await
            .unwrap();
    assert_eq!(a_tag_id.as_deref(), Some("t1"));
}

#[tokio::test]
async fn full_document_covers_every_entity_kind() {
    let env = TestEnv::create().await.unwrap();

    let report = run_deployment(env.pool(), FULL_DOCUMENT, &lenient())
        .await
        .unwrap();

    assert_eq!(report.io_ports, 1);
    assert_eq!(report.devices, 1);
    assert_eq!(report.tags, 2);
    assert_eq!(report.calculation_tags, 1);
    assert_eq!(report.stats_tags, 1);
    assert_eq!(report.bridges, 1);
    assert_eq!(report.blocks, 2);

    // Stats tag id was string-coerced and its reference resolved.
    let refer_tag_id: Option<String> =
        sqlx::query_scalar("SELECT refer_tag_id FROM stats_tags WHERE id = '100'")
            .fetch_one(env.pool())
            .await
            .unwrap();
    assert_eq!(refer_tag_id.as_deref(), Some("t1"));

    // Block order within the bridge is preserved.
    let blocks: Vec<(String, i64)> =
        sqlx::query_as("SELECT id, sort_order FROM bridge_blocks ORDER BY sort_order")
            .fetch_all(env.pool())
            .await
            .unwrap();
    assert_eq!(blocks[0], ("blk1".to_string(), 0));
    assert_eq!(blocks[1], ("blk2".to_string(), 1));
}

#[tokio::test]
async fn repeat_import_is_idempotent() {
    let env = TestEnv::create().await.unwrap();

    let first = run_deployment(env.pool(), FULL_DOCUMENT, &lenient())
        .await
        .unwrap();
    let second = run_deployment(env.pool(), FULL_DOCUMENT, &lenient())
        .await
        .unwrap();

    assert_eq!(first.io_ports, second.io_ports);
    assert_eq!(first.tags, second.tags);
    assert_eq!(first.blocks, second.blocks);

    // Tables hold exactly one import's worth of rows, not two.
    assert_eq!(env.count("io_ports").await, 1);
    assert_eq!(env.count("io_tags").await, 2);
    assert_eq!(env.count("bridge_blocks").await, 2);

    // The snapshot log, in contrast, is append-only.
    assert_eq!(env.count("config_snapshots").await, 2);
}

#[tokio::test]
async fn import_replaces_previous_entities() {
    let env = TestEnv::create().await.unwrap();

    run_deployment(env.pool(), FULL_DOCUMENT, &lenient())
        .await
        .unwrap();
    let report = run_deployment(env.pool(), SAMPLE_DOCUMENT, &lenient())
        .await
        .unwrap();

    assert_eq!(report.tags, 1);
    assert_eq!(env.count("io_tags").await, 1);
    assert_eq!(env.count("stats_tags").await, 0);
    assert_eq!(env.count("bridges").await, 0);
}

#[tokio::test]
async fn reference_resolution_is_case_insensitive() {
    let env = TestEnv::create().await.unwrap();

    let doc = r#"
io_setup:
  ports:
    - id: p1
      devices:
        - id: d1
          name: Device1
          tags:
            - id: t1
              name: Temp
calculation_tags:
  - id: c1
    a: "Device1:Temp"
  - id: c2
    a: "device1:temp"
"#;
    run_deployment(env.pool(), doc, &lenient()).await.unwrap();

    let resolved: Vec<Option<String>> =
        sqlx::query_scalar("SELECT a_tag_id FROM calculation_tags ORDER BY id")
            .fetch_all(env.pool())
            .await
            .unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].as_deref(), Some("t1"));
    assert_eq!(resolved[1].as_deref(), Some("t1"));
}

#[tokio::test]
async fn unresolved_references_insert_null_and_warn() {
    let env = TestEnv::create().await.unwrap();

    let doc = r#"
calculation_tags:
  - id: c1
    a: "Ghost:Tag"
stats_tags:
  - id: s1
    refer_tag: "Ghost:Tag"
    type: max
"#;
    let report = run_deployment(env.pool(), doc, &lenient()).await.unwrap();

    // Both tags are still created; the import does not abort.
    assert_eq!(report.calculation_tags, 1);
    assert_eq!(report.stats_tags, 1);
    assert_eq!(report.warnings.len(), 2);

    let a_tag_id: Option<String> =
        sqlx::query_scalar("SELECT a_tag_id FROM calculation_tags WHERE id = 'c1'")
            .fetch_one(env.pool())
            .await
            .unwrap();
    assert!(a_tag_id.is_none());

    let refer_tag_id: Option<String> =
        sqlx::query_scalar("SELECT refer_tag_id FROM stats_tags WHERE id = 's1'")
            .fetch_one(env.pool())
            .await
            .unwrap();
    assert!(refer_tag_id.is_none());
}

#[tokio::test]
async fn bridges_and_blocks_without_ids_are_skipped() {
    let env = TestEnv::create().await.unwrap();

    let doc = r#"
communication_forward:
  bridges:
    - blocks:
        - id: orphan
          type: source
    - id: br1
      blocks:
        - id: blk1
          type: source
        - type: filter
        - id: blk3
          type: destination
"#;
    let report = run_deployment(env.pool(), doc, &lenient()).await.unwrap();

    // The id-less bridge contributes nothing, including its block.
    assert_eq!(report.bridges, 1);
    // The id-less block is skipped while its siblings are inserted.
    assert_eq!(report.blocks, 2);

    let block_ids: Vec<String> =
        sqlx::query_scalar("SELECT id FROM bridge_blocks ORDER BY sort_order")
            .fetch_all(env.pool())
            .await
            .unwrap();
    assert_eq!(block_ids, ["blk1", "blk3"]);
}

#[tokio::test]
async fn empty_body_imports_nothing_but_stores_snapshot() {
    let env = TestEnv::create().await.unwrap();

    let report = run_deployment(env.pool(), "", &lenient()).await.unwrap();

    assert!(report.success);
    assert_eq!(report.io_ports, 0);
    assert_eq!(report.devices, 0);
    assert_eq!(report.tags, 0);
    assert_eq!(report.calculation_tags, 0);
    assert_eq!(report.stats_tags, 0);
    assert_eq!(report.bridges, 0);
    assert_eq!(report.blocks, 0);

    let stored = snapshot::latest(env.pool()).await.unwrap();
    assert_eq!(stored.raw, "");
}

#[tokio::test]
async fn invalid_format_leaves_store_untouched() {
    let env = TestEnv::create().await.unwrap();

    // Seed the store so we can prove nothing was wiped.
    run_deployment(env.pool(), SAMPLE_DOCUMENT, &lenient())
        .await
        .unwrap();

    let err = run_deployment(env.pool(), "{not: yaml: or: json", &lenient())
        .await
        .unwrap_err();
    assert!(matches!(err, CfgSrvError::InvalidConfigFormat));

    // No new snapshot, no change to the entity tables.
    assert_eq!(env.count("config_snapshots").await, 1);
    assert_eq!(env.count("io_ports").await, 1);
    assert_eq!(env.count("io_tags").await, 1);
    assert_eq!(env.count("calculation_tags").await, 1);
}

#[tokio::test]
async fn strict_references_rejects_and_rolls_back() {
    let env = TestEnv::create().await.unwrap();

    // Seed with a good document.
    run_deployment(env.pool(), SAMPLE_DOCUMENT, &lenient())
        .await
        .unwrap();

    let strict = ImportSection {
        strict_references: true,
        strict_duplicates: false,
    };
    let doc = r#"
calculation_tags:
  - id: c9
    a: "Ghost:Tag"
"#;
    let err = run_deployment(env.pool(), doc, &strict).await.unwrap_err();
    assert!(matches!(err, CfgSrvError::StrictMode(_)));

    // The transaction rolled back: the previous import is intact.
    assert_eq!(env.count("io_ports").await, 1);
    assert_eq!(env.count("io_tags").await, 1);
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM calculation_tags")
        .fetch_all(env.pool())
        .await
        .unwrap();
    assert_eq!(ids, ["c1"]);

    // The snapshot was still written before normalization began.
    assert_eq!(env.count("config_snapshots").await, 2);
}

#[tokio::test]
async fn strict_duplicates_rejects_document() {
    let env = TestEnv::create().await.unwrap();

    let doc = r#"
io_setup:
  ports:
    - id: p1
      devices:
        - id: d1
          name: PLC1
          tags:
            - id: t1
              name: Temp
            - id: t2
              name: temp
"#;
    // Lenient: last definition wins, with a warning.
    let report = run_deployment(env.pool(), doc, &lenient()).await.unwrap();
    assert_eq!(report.tags, 2);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("duplicate tag key")));

    let strict = ImportSection {
        strict_references: false,
        strict_duplicates: true,
    };
    let err = run_deployment(env.pool(), doc, &strict).await.unwrap_err();
    assert!(matches!(err, CfgSrvError::StrictMode(_)));
}

#[tokio::test]
async fn field_defaults_are_applied() {
    let env = TestEnv::create().await.unwrap();

    let doc = r#"
io_setup:
  ports:
    - id: p1
      devices:
        - id: d1
          name: PLC1
          tags:
            - id: t1
              name: Temp
"#;
    run_deployment(env.pool(), doc, &lenient()).await.unwrap();

    let (enabled, scan_time): (bool, i64) =
        sqlx::query_as("SELECT enabled, scan_time FROM io_ports WHERE id = 'p1'")
            .fetch_one(env.pool())
            .await
            .unwrap();
    assert!(enabled);
    assert_eq!(scan_time, 0);

    let (scale, offset, read_write): (f64, f64, String) =
        sqlx::query_as("SELECT scale, offset, read_write FROM io_tags WHERE id = 't1'")
            .fetch_one(env.pool())
            .await
            .unwrap();
    assert_eq!(scale, 1.0);
    assert_eq!(offset, 0.0);
    assert_eq!(read_write, "");
}

#[tokio::test]
async fn json_rejected_by_yaml_parser_uses_fallback_decoder() {
    let env = TestEnv::create().await.unwrap();

    // Duplicate mapping keys fail the YAML parse but are valid JSON.
    let doc = r#"{"io_setup": {"ports": []}, "io_setup": {"ports": [{"id": "p1"}]}}"#;
    let report = run_deployment(env.pool(), doc, &lenient()).await.unwrap();
    assert_eq!(report.io_ports, 1);
}

#[tokio::test]
async fn snapshot_latest_returns_most_recent() {
    let env = TestEnv::create().await.unwrap();

    snapshot::save(env.pool(), "first").await.unwrap();
    snapshot::save(env.pool(), "second").await.unwrap();

    let latest = snapshot::latest(env.pool()).await.unwrap();
    assert_eq!(latest.raw, "second");
    assert_eq!(snapshot::count(env.pool()).await.unwrap(), 2);
}

#[tokio::test]
async fn snapshot_latest_on_empty_log_is_not_found() {
    let env = TestEnv::create().await.unwrap();

    let err = snapshot::latest(env.pool()).await.unwrap_err();
    assert!(matches!(err, CfgSrvError::SnapshotNotFound));
}

#[tokio::test]
async fn malformed_entries_are_skipped_with_warnings() {
    let env = TestEnv::create().await.unwrap();

    // The second port entry is a scalar; the first is valid.
    let doc = r#"
io_setup:
  ports:
    - id: p1
      devices:
        - id: d1
          name: PLC1
          tags: "not-an-array"
    - 42
"#;
    let report = run_deployment(env.pool(), doc, &lenient()).await.unwrap();

    assert_eq!(report.io_ports, 1);
    assert_eq!(report.devices, 1);
    assert_eq!(report.tags, 0);
    assert!(!report.warnings.is_empty());
}
