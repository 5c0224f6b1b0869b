use contracts::domain::a002_historial_requerimiento::aggregate::HistorialRequerimiento;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::{ApiError, Operacion};

/// Журнал изменений requerimiento.
///
/// Существование самого requerimiento не проверяется: для неизвестного id
/// возвращается пустой список.
pub async fn list_by_requerimiento(
    db: &DatabaseConnection,
    requerimiento_id: i32,
) -> Result<Vec<HistorialRequerimiento>, ApiError> {
    let items = repository::list_by_requerimiento(db, requerimiento_id)
        .await
        .map_err(|e| ApiError::database(Operacion::Historial, e))?;
    Ok(items.into_iter().map(Into::into).collect())
}
