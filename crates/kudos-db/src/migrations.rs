use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kudos (
            id          TEXT PRIMARY KEY,
            sender_id   TEXT NOT NULL,
            receiver_id TEXT NOT NULL,
            message     TEXT NOT NULL,
            category    TEXT NOT NULL
                CHECK (category IN ('Great Job', 'Thank You', 'Teamwork')),
            created_at  TEXT NOT NULL
                DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_kudos_created
            ON kudos(created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

/// Apply every `.sql` file under `dir` in file-name order. Used when the
/// deployment ships migrations as files next to the binary instead of the
/// embedded schema.
pub fn run_from_dir(conn: &Connection, dir: &Path) -> Result<()> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("reading migrations dir {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    paths.sort();

    for path in &paths {
        let sql = std::fs::read_to_string(path)
            .with_context(|| format!("reading migration {}", path.display()))?;
        conn.execute_batch(&sql)
            .with_context(|| format!("applying migration {}", path.display()))?;
    }

    info!(
        "Applied {} migration files from {}",
        paths.len(),
        dir.display()
    );
    Ok(())
}
