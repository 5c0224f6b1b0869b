use chrono::NaiveDate;
use contracts::domain::a001_requerimiento::aggregate::{
    NuevoRequerimientoDto, Requerimiento, RequerimientoFiltro,
};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde_json::{Map, Value as JsonValue};

use super::campos::{self, Campo};
use super::repository::{self, Filtro, NuevoRequerimiento};
use crate::shared::error::{ApiError, Operacion};

pub const MSG_DATOS_INCOMPLETOS: &str = "Datos incompletos";
pub const MSG_FECHA_INVALIDA: &str = "Fecha de adquisición inválida";

/// Нормализация query-параметров списка: пустые строки считаются отсутствующими
pub fn parse_filtro(params: RequerimientoFiltro) -> Result<Filtro, ApiError> {
    fn non_empty(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.is_empty())
    }

    let fecha_adquisicion = match non_empty(params.fecha_adquisicion) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ApiError::validation(MSG_FECHA_INVALIDA))?,
        ),
        None => None,
    };

    Ok(Filtro {
        presupuesto: non_empty(params.presupuesto),
        unidad: non_empty(params.unidad),
        tipo_bien_servicio: non_empty(params.tipo_bien_servicio),
        fecha_adquisicion,
        proveedor: non_empty(params.proveedor),
    })
}

/// Разбор тела POST /requerimientos.
///
/// Сначала проверяется наличие шести обязательных ключей, затем значения
/// приводятся к типам столбцов (`"4"` для `cantidad` допустимо). Ошибкой
/// остаётся только значение, которое привести нельзя.
pub fn parse_nuevo(body: &[u8]) -> Result<NuevoRequerimiento, ApiError> {
    let map = match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => map,
        _ => return Err(ApiError::validation(MSG_DATOS_INCOMPLETOS)),
    };

    let missing = NuevoRequerimientoDto::REQUIRED_KEYS
        .iter()
        .any(|key| map.get(*key).map_or(true, JsonValue::is_null));
    if missing {
        return Err(ApiError::validation(MSG_DATOS_INCOMPLETOS));
    }

    let map: Map<String, JsonValue> = map
        .into_iter()
        .map(|(key, value)| {
            let campo = Campo::from_key(&key)
                .or_else(|| (key == "valor_total").then_some(Campo::ValorTotal));
            match campo {
                Some(campo) => (key, campo.normalizar(value)),
                None => (key, value),
            }
        })
        .collect();

    let dto: NuevoRequerimientoDto = serde_json::from_value(JsonValue::Object(map))
        .map_err(|e| ApiError::validation(format!("Datos inválidos: {}", e)))?;

    let (
        Some(presupuesto),
        Some(unidad),
        Some(tipo_bien_servicio),
        Some(cantidad),
        Some(valor_unitario),
        Some(proveedor),
    ) = (
        dto.presupuesto,
        dto.unidad,
        dto.tipo_bien_servicio,
        dto.cantidad,
        dto.valor_unitario,
        dto.proveedor,
    )
    else {
        return Err(ApiError::validation(MSG_DATOS_INCOMPLETOS));
    };

    Ok(NuevoRequerimiento {
        presupuesto,
        unidad,
        tipo_bien_servicio,
        cantidad,
        valor_unitario,
        valor_total: dto.valor_total,
        proveedor,
        documentacion: dto.documentacion,
    })
}

/// Получение списка активных requerimientos
pub async fn list_active(
    db: &DatabaseConnection,
    filtro: &Filtro,
) -> Result<Vec<Requerimiento>, ApiError> {
    let items = repository::list_active(db, filtro)
        .await
        .map_err(|e| ApiError::database(Operacion::Listar, e))?;
    Ok(items.into_iter().map(Into::into).collect())
}

/// Получение requerimiento по ID, включая деактивированные
pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Requerimiento, ApiError> {
    repository::get_by_id(db, id)
        .await
        .map_err(|e| ApiError::database(Operacion::Obtener, e))?
        .map(Into::into)
        .ok_or(ApiError::NotFound)
}

/// Создание: вставка и commit в одной транзакции, затем чтение по полученному id
pub async fn create(
    db: &DatabaseConnection,
    nuevo: NuevoRequerimiento,
) -> Result<Requerimiento, ApiError> {
    let op = Operacion::Crear;
    let txn = db.begin().await.map_err(|e| ApiError::database(op, e))?;

    let id = match repository::insert(&txn, &nuevo).await {
        Ok(id) => id,
        Err(e) => return Err(rollback(txn, op, e).await),
    };
    txn.commit().await.map_err(|e| ApiError::database(op, e))?;

    tracing::info!("Requerimiento {} creado", id);
    read_back(db, id, op).await
}

/// Частичное обновление по списку разрешённых полей
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    cambios: Vec<campos::Cambio>,
) -> Result<Requerimiento, ApiError> {
    let op = Operacion::Actualizar;
    let txn = db.begin().await.map_err(|e| ApiError::database(op, e))?;

    let affected = match repository::update_fields(&txn, id, &cambios).await {
        Ok(n) => n,
        Err(e) => return Err(rollback(txn, op, e).await),
    };
    if affected == 0 {
        // ничего не изменилось, commit не нужен
        discard(txn).await;
        return Err(ApiError::NotFound);
    }
    txn.commit().await.map_err(|e| ApiError::database(op, e))?;

    tracing::info!("Requerimiento {} actualizado ({} campos)", id, cambios.len());
    read_back(db, id, op).await
}

/// Мягкое удаление: `activo = false`. Повторный вызов тоже успешен.
pub async fn deactivate(db: &DatabaseConnection, id: i32) -> Result<(), ApiError> {
    let op = Operacion::Desactivar;
    let txn = db.begin().await.map_err(|e| ApiError::database(op, e))?;

    let affected = match repository::deactivate(&txn, id).await {
        Ok(n) => n,
        Err(e) => return Err(rollback(txn, op, e).await),
    };
    if affected == 0 {
        discard(txn).await;
        return Err(ApiError::NotFound);
    }
    txn.commit().await.map_err(|e| ApiError::database(op, e))?;

    tracing::info!("Requerimiento {} desactivado", id);
    Ok(())
}

async fn read_back(
    db: &DatabaseConnection,
    id: i32,
    op: Operacion,
) -> Result<Requerimiento, ApiError> {
    repository::get_by_id(db, id)
        .await
        .map_err(|e| ApiError::database(op, e))?
        .map(Into::into)
        .ok_or(ApiError::NotFound)
}

async fn rollback(txn: DatabaseTransaction, op: Operacion, err: sea_orm::DbErr) -> ApiError {
    discard(txn).await;
    ApiError::database(op, err)
}

async fn discard(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!("Rollback failed: {}", e);
    }
}
