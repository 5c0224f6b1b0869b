use serde::{Deserialize, Serialize};

/// Тело ответа с текстовым сообщением: `{"mensaje": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MensajeDto {
    pub mensaje: String,

    /// Идентификатор для поиска подробностей ошибки в логах сервера
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencia: Option<String>,
}

impl MensajeDto {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self {
            mensaje: mensaje.into(),
            referencia: None,
        }
    }

    pub fn with_referencia(mensaje: impl Into<String>, referencia: impl Into<String>) -> Self {
        Self {
            mensaje: mensaje.into(),
            referencia: Some(referencia.into()),
        }
    }
}
