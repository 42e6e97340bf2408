//! Example: editing a code translation table
//!
//! Loads a `transcode` table with a composite key, changes and deletes
//! rows through a `TableDataSet`, and reads them back with a templated
//! query. Statements are logged at debug level.
//!
//! Run with: cargo run --example transcode -p oxide-rowset-sqlite

use std::collections::HashMap;

use oxide_rowset::{DataSet, Datum, MetadataCache, QueryDataSet, TableDataSet};
use oxide_rowset_sqlite::SqliteConnector;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let conn = SqliteConnector::connect("sqlite::memory:").await?;
    sqlx::query(
        "CREATE TABLE transcode (
            app TEXT NOT NULL,
            tipo TEXT NOT NULL,
            codice_app TEXT,
            codice_vero TEXT NOT NULL,
            PRIMARY KEY (app, tipo, codice_vero)
        )",
    )
    .execute(conn.pool())
    .await?;

    let cache = MetadataCache::new();
    let mut tds = TableDataSet::new(&conn, &cache, "transcode").await?;
    println!("Key: {}", tds.key_def());

    // Insert a few rows
    let rows = [("1", "red", "R"), ("1", "green", "G"), ("2", "blue", "B")];
    for (tipo, codice_app, codice_vero) in rows {
        tds.add_record()?.set_values([
            ("app", "web"),
            ("tipo", tipo),
            ("codice_app", codice_app),
            ("codice_vero", codice_vero),
        ])?;
    }
    println!("Inserted {} rows", tds.save().await?);

    // Change one code and drop another
    tds.clear_records();
    tds.where_clause("app = 'web'").order("codice_vero");
    tds.fetch_records().await?;
    tds.record_mut(0)?.set_value("codice_app", "navy")?;
    tds.record_mut(1)?.mark_for_delete()?;
    println!("Saved {} rows, {} left", tds.save().await?, tds.len());

    // Read back with named parameters
    let values = HashMap::from([
        ("app".to_string(), Datum::Text("web".into())),
        ("tipo".to_string(), Datum::Long(2)),
    ]);
    let mut rows = QueryDataSet::with_macros(
        &conn,
        &cache,
        "SELECT codice_app, codice_vero FROM transcode WHERE app = ${app} AND tipo = ${tipo:str}",
        &values,
    )
    .await?;
    rows.fetch_records().await?;
    for record in rows.records() {
        println!("{record}");
    }

    Ok(())
}
