use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_requerimiento::aggregate::{Requerimiento, RequerimientoFiltro};
use contracts::domain::a002_historial_requerimiento::aggregate::HistorialRequerimiento;
use contracts::shared::mensaje::MensajeDto;

use crate::domain::{a001_requerimiento, a002_historial_requerimiento};
use crate::shared::error::ApiError;
use crate::shared::state::AppState;

pub const GREETING: &str = "¡Hola desde el servicio de requerimientos!";

/// Id из пути: только положительное целое, иначе 404 как для отсутствующей записи
fn parse_id(raw: &str) -> Result<i32, ApiError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::NotFound),
    }
}

/// GET /
pub async fn index() -> &'static str {
    GREETING
}

/// GET /requerimientos
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<RequerimientoFiltro>,
) -> Result<Json<Vec<Requerimiento>>, ApiError> {
    let filtro = a001_requerimiento::service::parse_filtro(params)?;
    let items = a001_requerimiento::service::list_active(&state.db, &filtro).await?;
    Ok(Json(items))
}

/// GET /requerimientos/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Requerimiento>, ApiError> {
    let id = parse_id(&id)?;
    let item = a001_requerimiento::service::get_by_id(&state.db, id).await?;
    Ok(Json(item))
}

/// GET /requerimientos/:id/historial
pub async fn get_historial(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HistorialRequerimiento>>, ApiError> {
    let id = parse_id(&id)?;
    let items = a002_historial_requerimiento::service::list_by_requerimiento(&state.db, id).await?;
    Ok(Json(items))
}

/// POST /requerimientos
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Requerimiento>), ApiError> {
    let nuevo = a001_requerimiento::service::parse_nuevo(&body)?;
    let created = a001_requerimiento::service::create(&state.db, nuevo).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /requerimientos/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Requerimiento>, ApiError> {
    let id = parse_id(&id)?;
    let cambios = a001_requerimiento::campos::parse_cambios(&body)?;
    let updated = a001_requerimiento::service::update(&state.db, id, cambios).await?;
    Ok(Json(updated))
}

/// PUT /requerimientos/desactivar/:id
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MensajeDto>, ApiError> {
    let id = parse_id(&id)?;
    a001_requerimiento::service::deactivate(&state.db, id).await?;
    Ok(Json(MensajeDto::new(format!(
        "Requerimiento con ID {} desactivado",
        id
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_positive_integers_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        for raw in ["0", "-3", "abc", "1.5", "", "99999999999"] {
            assert!(matches!(parse_id(raw), Err(ApiError::NotFound)), "{raw}");
        }
    }
}
