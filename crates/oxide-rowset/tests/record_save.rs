mod common;

use common::{people, transcode, transcode_row, MockConnector};
use oxide_rowset::{DataSet, Datum, Error, MetadataCache, Param, SaveIntent, TableDataSet};

async fn fetched<'c>(
    conn: &'c MockConnector,
    cache: &MetadataCache,
) -> TableDataSet<'c, MockConnector> {
    conn.push_rows(vec![
        transcode_row("a", "1", "x1", "v1"),
        transcode_row("a", "2", "x2", "v2"),
    ]);
    let mut tds = TableDataSet::new(conn, cache, "stp.transcode").await.unwrap();
    tds.where_clause("app = 'a'");
    tds.fetch_records().await.unwrap();
    tds
}

#[tokio::test]
async fn test_update_of_one_column_by_composite_key() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;

    let record = tds.record_mut(0).unwrap();
    record.set_value("codice_app", "y1").unwrap();
    assert!(record.needs_to_be_saved());

    let saved = tds.save().await.unwrap();
    assert_eq!(saved, 1);

    let executed = conn.executed();
    assert_eq!(executed.len(), 1);
    let (sql, params) = &executed[0];
    assert_eq!(
        sql,
        "UPDATE stp.transcode SET codice_app = ? WHERE app = ? AND tipo = ? AND codice_vero = ?"
    );
    assert_eq!(
        params,
        &vec![
            Param::Text("y1".into()),
            Param::Text("a".into()),
            Param::Text("1".into()),
            Param::Text("v1".into()),
        ]
    );

    let record = tds.record(0).unwrap();
    assert!(record.is_clean());
    assert_eq!(record.intent(), SaveIntent::Unknown);
}

#[tokio::test]
async fn test_changing_a_key_column_is_rejected() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;

    tds.record_mut(0).unwrap().set_value("tipo", "9").unwrap();
    let err = tds.save().await.unwrap_err();
    assert!(matches!(err, Error::KeyColumnDirty(ref name) if name == "tipo"));
    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn test_delete_then_remove_zombie() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;

    tds.record_mut(1).unwrap().mark_for_delete().unwrap();
    assert_eq!(tds.save().await.unwrap(), 1);

    assert_eq!(tds.len(), 1);
    assert_eq!(
        conn.executed()[0].0,
        "DELETE FROM stp.transcode WHERE app = ? AND tipo = ? AND codice_vero = ?"
    );
}

#[tokio::test]
async fn test_zombie_cannot_be_deleted_twice() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;

    let record = tds.record_mut(0).unwrap();
    record.mark_for_delete().unwrap();
    record.save(&conn).await.unwrap();
    assert!(record.is_zombie());
    assert!(!record.needs_to_be_saved());

    let err = record.mark_for_delete().unwrap_err();
    assert_eq!(err.to_string(), "This record has already been deleted!");
    assert!(matches!(record.unmark(), Err(Error::AlreadyDeleted)));
    assert_eq!(record.save(&conn).await.unwrap(), 0);
    assert_eq!(conn.executed().len(), 1);
}

#[tokio::test]
async fn test_unexpected_row_count_after_update() {
    let conn = MockConnector::new(vec![transcode()]);
    conn.push_execute(3, None);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;

    let record = tds.record_mut(0).unwrap();
    record.set_value("codice_app", "y").unwrap();
    let err = record.save(&conn).await.unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedRowCount {
            operation: "UPDATE",
            count: 3
        }
    ));
    // The statement ran, so the record no longer holds changes
    assert!(record.is_clean());
}

#[tokio::test]
async fn test_insert_with_generated_key() {
    let conn = MockConnector::new(vec![people()]);
    conn.push_execute(1, Some(17));
    let cache = MetadataCache::new();
    let mut tds = TableDataSet::new(&conn, &cache, "people").await.unwrap();
    tds.set_generated_keys(true);

    tds.add_record().unwrap().set_value("name", "Ada").unwrap();
    assert_eq!(tds.save().await.unwrap(), 1);

    let (sql, params) = &conn.executed()[0];
    assert_eq!(sql, "INSERT INTO people ( name ) VALUES ( ? )");
    assert_eq!(params, &vec![Param::Text("Ada".into())]);

    let record = tds.record(0).unwrap();
    assert_eq!(record.value("id").unwrap().as_i64().unwrap(), 17);
    assert!(record.is_clean());
    assert_eq!(record.intent(), SaveIntent::Unknown);
}

#[tokio::test]
async fn test_generated_keys_need_one_key_column() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = TableDataSet::new(&conn, &cache, "stp.transcode").await.unwrap();
    tds.set_generated_keys(true);

    tds.add_record().unwrap().set_value("app", "n").unwrap();
    assert!(matches!(
        tds.save().await,
        Err(Error::GeneratedKeyColumns(3))
    ));
    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn test_refresh_on_save_reloads_row() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;
    tds.set_refresh_on_save(true);
    conn.push_rows(vec![transcode_row("a", "1", "from-db", "v1")]);

    tds.record_mut(0).unwrap().set_value("codice_app", "y1").unwrap();
    tds.save().await.unwrap();

    let queries = conn.queries();
    assert_eq!(
        queries.last().unwrap().0,
        "SELECT app, tipo, codice_app, codice_vero FROM stp.transcode \
         WHERE app = ? AND tipo = ? AND codice_vero = ?"
    );
    let record = tds.record(0).unwrap();
    assert_eq!(
        record.value("codice_app").unwrap().as_string().as_deref(),
        Some("from-db")
    );
    assert!(record.is_clean());
}

#[tokio::test]
async fn test_refresh_discards_changes() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;
    conn.push_rows(vec![transcode_row("a", "2", "x2", "v2")]);

    let record = tds.record_mut(1).unwrap();
    record.set_value("codice_app", "changed").unwrap();
    record.mark_for_update().unwrap();
    record.refresh(&conn).await.unwrap();

    assert!(record.is_clean());
    assert_eq!(record.intent(), SaveIntent::Unknown);
    assert_eq!(
        record.value("codice_app").unwrap().as_string().as_deref(),
        Some("x2")
    );
}

#[tokio::test]
async fn test_refresh_of_missing_row() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = fetched(&conn, &cache).await;

    let err = tds.refresh_all().await.unwrap_err();
    assert!(matches!(err, Error::RowNotFound(_)));
}

#[tokio::test]
async fn test_insert_with_set_values() {
    let conn = MockConnector::new(vec![transcode()]);
    let cache = MetadataCache::new();
    let mut tds = TableDataSet::new(&conn, &cache, "stp.transcode").await.unwrap();

    tds.add_record()
        .unwrap()
        .set_values([
            ("app", "d"),
            ("tipo", "d"),
            ("codice_vero", "PIPPO"),
            ("codice_app", "PLUTO"),
        ])
        .unwrap();
    tds.save().await.unwrap();

    let (sql, params) = &conn.executed()[0];
    assert_eq!(
        sql,
        "INSERT INTO stp.transcode ( app, tipo, codice_app, codice_vero ) VALUES ( ?, ?, ?, ? )"
    );
    assert_eq!(params[2], Param::Text("PLUTO".into()));
    assert_eq!(
        tds.record(0).unwrap().value("app").unwrap().datum(),
        Some(&Datum::Text("d".into()))
    );
}
