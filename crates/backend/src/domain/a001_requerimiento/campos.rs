//! Поля Requerimiento, которые клиент может менять через PUT.
//!
//! Ключ JSON никогда не попадает в SQL: он сопоставляется с `Column`
//! через статический список, а в запрос уходит только значение.

use sea_orm::Value;
use serde_json::{Map, Number, Value as JsonValue};

use super::repository::Column;
use crate::shared::error::ApiError;

pub const MSG_SIN_DATOS: &str = "No se proporcionaron datos para actualizar";
pub const MSG_SIN_CAMPOS: &str = "No se proporcionaron campos válidos para actualizar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TipoCampo {
    Texto,
    Entero,
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Campo {
    Presupuesto,
    Unidad,
    TipoBienServicio,
    Cantidad,
    ValorUnitario,
    ValorTotal,
    Proveedor,
    Documentacion,
}

impl Campo {
    pub const ALL: [Campo; 8] = [
        Campo::Presupuesto,
        Campo::Unidad,
        Campo::TipoBienServicio,
        Campo::Cantidad,
        Campo::ValorUnitario,
        Campo::ValorTotal,
        Campo::Proveedor,
        Campo::Documentacion,
    ];

    /// Ключ в теле запроса
    pub fn key(self) -> &'static str {
        match self {
            Campo::Presupuesto => "presupuesto",
            Campo::Unidad => "unidad",
            Campo::TipoBienServicio => "tipoBienServicio",
            Campo::Cantidad => "cantidad",
            Campo::ValorUnitario => "valorUnitario",
            Campo::ValorTotal => "valorTotal",
            Campo::Proveedor => "proveedor",
            Campo::Documentacion => "documentacion",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|campo| campo.key() == key)
    }

    pub fn column(self) -> Column {
        match self {
            Campo::Presupuesto => Column::Presupuesto,
            Campo::Unidad => Column::Unidad,
            Campo::TipoBienServicio => Column::TipoBienServicio,
            Campo::Cantidad => Column::Cantidad,
            Campo::ValorUnitario => Column::ValorUnitario,
            Campo::ValorTotal => Column::ValorTotal,
            Campo::Proveedor => Column::Proveedor,
            Campo::Documentacion => Column::Documentacion,
        }
    }

    fn tipo(self) -> TipoCampo {
        match self {
            Campo::Cantidad => TipoCampo::Entero,
            Campo::ValorUnitario | Campo::ValorTotal => TipoCampo::Decimal,
            _ => TipoCampo::Texto,
        }
    }

    pub fn nullable(self) -> bool {
        matches!(self, Campo::ValorTotal | Campo::Documentacion)
    }

    /// Приведение по типу столбца, как при записи в SQLite: строка с числом
    /// подходит числовому столбцу, число подходит текстовому. Остальное
    /// возвращается без изменений.
    pub fn normalizar(self, value: JsonValue) -> JsonValue {
        match (self.tipo(), value) {
            (TipoCampo::Texto, JsonValue::Number(n)) => JsonValue::String(n.to_string()),
            (TipoCampo::Entero, JsonValue::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => JsonValue::from(n),
                Err(_) => JsonValue::String(s),
            },
            (TipoCampo::Decimal, JsonValue::String(s)) => {
                match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                    Some(n) => JsonValue::Number(n),
                    None => JsonValue::String(s),
                }
            }
            (_, value) => value,
        }
    }

    /// Convert a JSON value into a bindable SQL value of the column's type
    pub fn bind(self, value: &JsonValue) -> Option<Value> {
        if value.is_null() {
            if !self.nullable() {
                return None;
            }
            return Some(match self.tipo() {
                TipoCampo::Texto => Value::String(None),
                TipoCampo::Entero => Value::BigInt(None),
                TipoCampo::Decimal => Value::Double(None),
            });
        }

        let value = self.normalizar(value.clone());
        match self.tipo() {
            TipoCampo::Texto => value.as_str().map(|s| Value::from(s.to_owned())),
            TipoCampo::Entero => value.as_i64().map(Value::from),
            TipoCampo::Decimal => value.as_f64().map(Value::from),
        }
    }
}

/// Одно присваивание в `UPDATE ... SET`
#[derive(Debug, Clone, PartialEq)]
pub struct Cambio {
    pub campo: Campo,
    pub valor: Value,
}

/// Разбор тела PUT /requerimientos/:id.
///
/// Пустое тело → 400, неизвестные ключи игнорируются, ни одного известного
/// ключа → 400, значение не того типа → 400.
pub fn parse_cambios(body: &[u8]) -> Result<Vec<Cambio>, ApiError> {
    let map: Map<String, JsonValue> = match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) if !map.is_empty() => map,
        _ => return Err(ApiError::validation(MSG_SIN_DATOS)),
    };

    let mut cambios = Vec::new();
    for (key, value) in &map {
        let Some(campo) = Campo::from_key(key) else {
            tracing::debug!("Ignoring unknown update key '{}'", key);
            continue;
        };
        let valor = campo
            .bind(value)
            .ok_or_else(|| ApiError::validation(format!("Datos inválidos: {}", key)))?;
        cambios.push(Cambio { campo, valor });
    }

    if cambios.is_empty() {
        return Err(ApiError::validation(MSG_SIN_CAMPOS));
    }
    Ok(cambios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mensaje(err: ApiError) -> String {
        match err {
            ApiError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_keys_map_to_snake_case_columns() {
        use sea_orm::IdenStatic;
        assert_eq!(Campo::from_key("tipoBienServicio"), Some(Campo::TipoBienServicio));
        assert_eq!(Campo::TipoBienServicio.column().as_str(), "tipo_bien_servicio");
        assert_eq!(Campo::ValorUnitario.column().as_str(), "valor_unitario");
        assert_eq!(Campo::ValorTotal.column().as_str(), "valor_total");
        // столбцы не из списка недоступны даже по точному имени
        assert_eq!(Campo::from_key("activo"), None);
        assert_eq!(Campo::from_key("id"), None);
        assert_eq!(Campo::from_key("tipo_bien_servicio"), None);
    }

    #[test]
    fn test_bind_checks_types() {
        assert_eq!(
            Campo::Cantidad.bind(&json!(4)),
            Some(Value::BigInt(Some(4)))
        );
        assert_eq!(Campo::Cantidad.bind(&json!("cuatro")), None);
        assert_eq!(Campo::Cantidad.bind(&json!(4.5)), None);
        assert_eq!(Campo::Cantidad.bind(&json!(true)), None);
        assert_eq!(
            Campo::ValorUnitario.bind(&json!(12)),
            Some(Value::Double(Some(12.0)))
        );
        assert_eq!(Campo::Proveedor.bind(&json!(["ACME"])), None);
    }

    #[test]
    fn test_bind_converts_like_column_affinity() {
        assert_eq!(
            Campo::Cantidad.bind(&json!("4")),
            Some(Value::BigInt(Some(4)))
        );
        assert_eq!(
            Campo::ValorTotal.bind(&json!(" 30.5 ")),
            Some(Value::Double(Some(30.5)))
        );
        assert_eq!(
            Campo::Proveedor.bind(&json!(12)),
            Some(Value::from("12".to_string()))
        );
        assert_eq!(Campo::Unidad.normalizar(json!(null)), json!(null));
        assert_eq!(Campo::ValorUnitario.normalizar(json!("NaN")), json!("NaN"));
    }

    #[test]
    fn test_bind_null_only_for_nullable_fields() {
        assert_eq!(
            Campo::Documentacion.bind(&JsonValue::Null),
            Some(Value::String(None))
        );
        assert_eq!(
            Campo::ValorTotal.bind(&JsonValue::Null),
            Some(Value::Double(None))
        );
        assert_eq!(Campo::Presupuesto.bind(&JsonValue::Null), None);
        assert_eq!(Campo::Cantidad.bind(&JsonValue::Null), None);
    }

    #[test]
    fn test_parse_cambios_ignores_unknown_keys() {
        let body = json!({"proveedor": "ACME", "activo": false, "id": 99}).to_string();
        let cambios = parse_cambios(body.as_bytes()).unwrap();
        assert_eq!(
            cambios,
            vec![Cambio {
                campo: Campo::Proveedor,
                valor: Value::from("ACME".to_string()),
            }]
        );
    }

    #[test]
    fn test_parse_cambios_rejects_empty_bodies() {
        for body in ["", "null", "{}", "[]", "not json"] {
            assert_eq!(
                mensaje(parse_cambios(body.as_bytes()).unwrap_err()),
                MSG_SIN_DATOS,
                "body {body:?}"
            );
        }
    }

    #[test]
    fn test_parse_cambios_rejects_only_unknown_keys() {
        let err = parse_cambios(br#"{"color": "rojo"}"#).unwrap_err();
        assert_eq!(mensaje(err), MSG_SIN_CAMPOS);
    }

    #[test]
    fn test_parse_cambios_reports_bad_value() {
        let err = parse_cambios(br#"{"cantidad": "muchos"}"#).unwrap_err();
        assert_eq!(mensaje(err), "Datos inválidos: cantidad");
    }
}
