use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Aggregate
// ============================================================================

/// Requerimiento: заявка на приобретение товара или услуги.
///
/// Записи никогда не удаляются физически: деактивация выставляет
/// `activo = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requerimiento {
    pub id: i32,
    pub presupuesto: String,
    pub unidad: String,
    pub tipo_bien_servicio: String,
    pub cantidad: i64,
    pub valor_unitario: f64,
    pub valor_total: Option<f64>,
    /// Заполняется базой данных при вставке
    pub fecha_adquisicion: Option<NaiveDateTime>,
    pub proveedor: String,
    pub documentacion: Option<String>,
    pub activo: bool,
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Тело запроса POST /requerimientos
///
/// Все поля опциональны на уровне десериализации: отсутствие обязательного
/// поля проверяется отдельно, чтобы ответить "Datos incompletos".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NuevoRequerimientoDto {
    pub presupuesto: Option<String>,
    pub unidad: Option<String>,

    #[serde(rename = "tipoBienServicio")]
    pub tipo_bien_servicio: Option<String>,

    pub cantidad: Option<i64>,

    #[serde(rename = "valorUnitario")]
    pub valor_unitario: Option<f64>,

    #[serde(rename = "valor_total", alias = "valorTotal")]
    pub valor_total: Option<f64>,

    pub proveedor: Option<String>,
    pub documentacion: Option<String>,
}

impl NuevoRequerimientoDto {
    /// Ключи JSON, без которых создание невозможно
    pub const REQUIRED_KEYS: [&'static str; 6] = [
        "presupuesto",
        "unidad",
        "tipoBienServicio",
        "cantidad",
        "valorUnitario",
        "proveedor",
    ];
}

/// Query-параметры GET /requerimientos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequerimientoFiltro {
    pub presupuesto: Option<String>,
    pub unidad: Option<String>,
    pub tipo_bien_servicio: Option<String>,
    /// Дата в формате YYYY-MM-DD
    pub fecha_adquisicion: Option<String>,
    pub proveedor: Option<String>,
}
