use once_cell::sync::OnceCell;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/salespulse.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    ensure_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    tracing::info!("Database ready at {}", absolute_path.display());
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Opens a private in-memory database with the schema applied.
///
/// One pooled connection only: every sqlite `:memory:` connection is its own database.
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    ensure_schema(&conn).await?;
    Ok(conn)
}

/// Ensure required tables exist (minimal schema bootstrap)
pub async fn ensure_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let check_sales_order_table = r#"
        SELECT name FROM sqlite_master WHERE type='table' AND name='a001_sales_order';
    "#;
    let sales_order_table_exists = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            check_sales_order_table.to_string(),
        ))
        .await?;

    if sales_order_table_exists.is_empty() {
        tracing::info!("Creating a001_sales_order table");
        let create_sales_order_table_sql = r#"
            CREATE TABLE a001_sales_order (
                id TEXT PRIMARY KEY NOT NULL,
                order_id TEXT NOT NULL,
                region TEXT NOT NULL,
                country TEXT NOT NULL,
                product TEXT NOT NULL,
                revenue REAL NOT NULL,
                order_date TEXT NOT NULL,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sales_order_table_sql.to_string(),
        ))
        .await?;
    }

    // OrderID is the business key: at most one row per value
    let indexes = [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_a001_sales_order_order_id ON a001_sales_order (order_id);",
        "CREATE INDEX IF NOT EXISTS idx_a001_sales_order_geo ON a001_sales_order (region, country);",
    ];
    for sql in indexes {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }

    Ok(())
}
