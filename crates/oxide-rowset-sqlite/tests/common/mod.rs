#![allow(dead_code)]

use oxide_rowset_sqlite::SqliteConnector;
use sqlx::sqlite::SqlitePoolOptions;

pub const URL: &str = "sqlite::memory:";

pub async fn connector() -> SqliteConnector {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(URL)
        .await
        .expect("Failed to create pool");
    SqliteConnector::new(pool, URL)
}

/// `transcode` keyed by `(app, tipo, codice_vero)`: six rows for app
/// `a`, two for `b`, one for `c`.
pub async fn transcode_db() -> SqliteConnector {
    let conn = connector().await;
    sqlx::query(
        "CREATE TABLE transcode (
            app VARCHAR(10) NOT NULL,
            tipo VARCHAR(10) NOT NULL,
            codice_app VARCHAR(20),
            codice_vero VARCHAR(20) NOT NULL,
            PRIMARY KEY (app, tipo, codice_vero)
        )",
    )
    .execute(conn.pool())
    .await
    .expect("Failed to create transcode");

    let rows = [
        ("a", "1", "x1", "v1"),
        ("a", "1", "x2", "v2"),
        ("a", "2", "x3", "v3"),
        ("a", "2", "x4", "v4"),
        ("a", "3", "x5", "v5"),
        ("a", "3", "x6", "v6"),
        ("b", "1", "y1", "w1"),
        ("b", "2", "y2", "w2"),
        ("c", "1", "z1", "u1"),
    ];
    for (app, tipo, codice_app, codice_vero) in rows {
        sqlx::query("INSERT INTO transcode VALUES (?, ?, ?, ?)")
            .bind(app)
            .bind(tipo)
            .bind(codice_app)
            .bind(codice_vero)
            .execute(conn.pool())
            .await
            .expect("Failed to insert transcode row");
    }
    conn
}

/// `people` with an integer rowid key and typed columns.
pub async fn people_db() -> SqliteConnector {
    let conn = connector().await;
    sqlx::query(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            born DATE,
            updated DATETIME,
            score REAL,
            active BOOLEAN
        )",
    )
    .execute(conn.pool())
    .await
    .expect("Failed to create people");
    conn
}
