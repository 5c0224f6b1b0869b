use std::path::Path;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

use crate::shared::config::{get_database_path, DatabaseConfig};

const CREATE_REQUERIMIENTOS_TABLE: &str = r#"
    CREATE TABLE Requerimientos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        presupuesto TEXT NOT NULL,
        unidad TEXT NOT NULL,
        tipo_bien_servicio TEXT NOT NULL,
        cantidad INTEGER NOT NULL,
        valor_unitario REAL NOT NULL,
        valor_total REAL,
        fecha_adquisicion TEXT DEFAULT CURRENT_TIMESTAMP,
        proveedor TEXT NOT NULL,
        documentacion TEXT,
        activo INTEGER NOT NULL DEFAULT 1
    );
"#;

const CREATE_HISTORIAL_TABLE: &str = r#"
    CREATE TABLE HistorialRequerimientos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        requerimientos_id INTEGER NOT NULL REFERENCES Requerimientos(id),
        fecha_cambio TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        detalles TEXT NOT NULL
    );
"#;

const CREATE_HISTORIAL_INDEX: &str = r#"
    CREATE INDEX idx_historial_requerimientos_id
        ON HistorialRequerimientos (requerimientos_id, fecha_cambio);
"#;

// Журнал изменений ведёт база, сервис его только читает
const CREATE_INSERT_TRIGGER: &str = r#"
    CREATE TRIGGER trg_requerimientos_insert
    AFTER INSERT ON Requerimientos
    BEGIN
        INSERT INTO HistorialRequerimientos (requerimientos_id, fecha_cambio, detalles)
        VALUES (NEW.id, CURRENT_TIMESTAMP, 'Requerimiento creado');
    END;
"#;

const CREATE_UPDATE_TRIGGER: &str = r#"
    CREATE TRIGGER trg_requerimientos_update
    AFTER UPDATE ON Requerimientos
    BEGIN
        INSERT INTO HistorialRequerimientos (requerimientos_id, fecha_cambio, detalles)
        VALUES (
            NEW.id,
            CURRENT_TIMESTAMP,
            CASE
                WHEN OLD.activo = 1 AND NEW.activo = 0 THEN 'Requerimiento desactivado'
                ELSE 'Requerimiento actualizado'
            END
        );
    END;
"#;

/// Open the pool for the configured SQLite file and make sure the schema exists
pub async fn initialize_database(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db_file = get_database_path(config);
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db_url = sqlite_url(&db_file)?;
    tracing::info!("Opening database {}", db_file.display());

    connect(&db_url, config.max_connections, config.acquire_timeout()).await
}

/// Connect to `db_url` and bootstrap the schema.
///
/// Every request borrows a connection from this pool and gives it back when
/// the borrow goes out of scope.
pub async fn connect(
    db_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(db_url.to_owned());
    options
        .max_connections(max_connections.max(1))
        .acquire_timeout(acquire_timeout)
        .sqlx_logging(false);

    let conn = Database::connect(options).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

fn sqlite_url(db_file: &Path) -> anyhow::Result<String> {
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

/// Ensure required tables, index and audit triggers exist
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    ensure_object(conn, "table", "Requerimientos", CREATE_REQUERIMIENTOS_TABLE).await?;
    ensure_object(conn, "table", "HistorialRequerimientos", CREATE_HISTORIAL_TABLE).await?;
    ensure_object(
        conn,
        "index",
        "idx_historial_requerimientos_id",
        CREATE_HISTORIAL_INDEX,
    )
    .await?;
    ensure_object(conn, "trigger", "trg_requerimientos_insert", CREATE_INSERT_TRIGGER).await?;
    ensure_object(conn, "trigger", "trg_requerimientos_update", CREATE_UPDATE_TRIGGER).await?;
    Ok(())
}

async fn ensure_object(
    conn: &DatabaseConnection,
    kind: &str,
    name: &str,
    ddl: &str,
) -> anyhow::Result<()> {
    let existing = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = ? AND name = ?",
            [kind.into(), name.into()],
        ))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} {}", kind, name);
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, ddl.to_string()))
            .await?;
    }
    Ok(())
}
