use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::mensaje::MensajeDto;
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;
use uuid::Uuid;

pub const MSG_DB_UNAVAILABLE: &str = "Error al conectar a la base de datos";
pub const MSG_NOT_FOUND: &str = "Requerimiento no encontrado";

/// Операция, во время которой упал запрос к базе
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operacion {
    Listar,
    Obtener,
    Historial,
    Crear,
    Actualizar,
    Desactivar,
}

impl Operacion {
    pub fn mensaje(self) -> &'static str {
        match self {
            Operacion::Listar => "Error al consultar los requerimientos",
            Operacion::Obtener => "Error al consultar el requerimiento",
            Operacion::Historial => "Error al consultar el historial del requerimiento",
            Operacion::Crear => "Error al crear el requerimiento",
            Operacion::Actualizar => "Error al actualizar el requerimiento",
            Operacion::Desactivar => "Error al desactivar el requerimiento",
        }
    }
}

impl fmt::Display for Operacion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mensaje())
    }
}

/// Ошибки обработки запроса.
///
/// Единая точка перевода ошибок драйвера в HTTP-ответ: и чтение, и запись
/// проходят через `ApiError::database`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", MSG_NOT_FOUND)]
    NotFound,

    #[error("{}", MSG_DB_UNAVAILABLE)]
    Unavailable(#[source] DbErr),

    #[error("{operacion}")]
    Database {
        operacion: Operacion,
        #[source]
        source: DbErr,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Classify a driver error: pool/connection failures become `Unavailable`
    pub fn database(operacion: Operacion, source: DbErr) -> Self {
        if is_connection_error(&source) {
            ApiError::Unavailable(source)
        } else {
            ApiError::Database { operacion, source }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) | ApiError::Database { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn is_connection_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            )
        }
        _ => false,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(message) => MensajeDto::new(message.clone()),
            ApiError::NotFound => MensajeDto::new(MSG_NOT_FOUND),
            ApiError::Unavailable(source) => {
                tracing::error!("{}: {}", MSG_DB_UNAVAILABLE, source);
                MensajeDto::new(MSG_DB_UNAVAILABLE)
            }
            ApiError::Database { operacion, source } => {
                let referencia = Uuid::new_v4().to_string();
                tracing::error!(referencia = %referencia, "{}: {}", operacion, source);
                MensajeDto::with_referencia(
                    format!("{} (referencia {})", operacion, referencia),
                    referencia,
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnAcquireErr;

    #[test]
    fn test_pool_failures_are_unavailable() {
        let err = ApiError::database(
            Operacion::Listar,
            DbErr::ConnectionAcquire(ConnAcquireErr::Timeout),
        );
        assert!(matches!(err, ApiError::Unavailable(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), MSG_DB_UNAVAILABLE);

        let err = ApiError::database(
            Operacion::Crear,
            DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::PoolClosed)),
        );
        assert!(matches!(err, ApiError::Unavailable(_)));
    }

    #[test]
    fn test_execution_failures_keep_operation() {
        let err = ApiError::database(
            Operacion::Actualizar,
            DbErr::Exec(RuntimeErr::Internal("constraint failed".into())),
        );
        match &err {
            ApiError::Database { operacion, .. } => assert_eq!(*operacion, Operacion::Actualizar),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.to_string(), "Error al actualizar el requerimiento");
    }

    #[tokio::test]
    async fn test_execution_failure_body_hides_driver_detail() {
        let err = ApiError::database(
            Operacion::Desactivar,
            DbErr::Exec(RuntimeErr::Internal("near \"UPDATE\": syntax error".into())),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: MensajeDto = serde_json::from_slice(&bytes).unwrap();
        let referencia = body.referencia.expect("referencia");
        assert!(Uuid::parse_str(&referencia).is_ok());
        assert!(body.mensaje.starts_with("Error al desactivar el requerimiento"));
        assert!(!body.mensaje.contains("syntax error"));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::NotFound.to_string(), "Requerimiento no encontrado");
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
    }
}
