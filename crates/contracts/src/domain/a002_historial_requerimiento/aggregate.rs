use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Запись журнала изменений Requerimiento.
///
/// Пишется триггерами базы данных, сервис только читает. Ссылка на
/// requerimiento в ответ не входит: она уже есть в пути запроса.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorialRequerimiento {
    pub id: i32,
    pub fecha_cambio: NaiveDateTime,
    pub detalles: String,
}
