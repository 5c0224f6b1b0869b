use chrono::NaiveDate;
use contracts::domain::a001_requerimiento::aggregate::Requerimiento;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Select, Set, UpdateMany};

use super::campos::Cambio;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Requerimientos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub presupuesto: String,
    pub unidad: String,
    pub tipo_bien_servicio: String,
    pub cantidad: i64,
    pub valor_unitario: f64,
    #[sea_orm(nullable)]
    pub valor_total: Option<f64>,
    #[sea_orm(nullable)]
    pub fecha_adquisicion: Option<chrono::NaiveDateTime>,
    pub proveedor: String,
    #[sea_orm(nullable)]
    pub documentacion: Option<String>,
    pub activo: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Requerimiento {
    fn from(m: Model) -> Self {
        Requerimiento {
            id: m.id,
            presupuesto: m.presupuesto,
            unidad: m.unidad,
            tipo_bien_servicio: m.tipo_bien_servicio,
            cantidad: m.cantidad,
            valor_unitario: m.valor_unitario,
            valor_total: m.valor_total,
            fecha_adquisicion: m.fecha_adquisicion,
            proveedor: m.proveedor,
            documentacion: m.documentacion,
            activo: m.activo,
        }
    }
}

/// Фильтры списка после нормализации query-параметров
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filtro {
    pub presupuesto: Option<String>,
    pub unidad: Option<String>,
    pub tipo_bien_servicio: Option<String>,
    pub fecha_adquisicion: Option<NaiveDate>,
    pub proveedor: Option<String>,
}

/// Данные для вставки, все обязательные поля уже проверены
#[derive(Debug, Clone, PartialEq)]
pub struct NuevoRequerimiento {
    pub presupuesto: String,
    pub unidad: String,
    pub tipo_bien_servicio: String,
    pub cantidad: i64,
    pub valor_unitario: f64,
    pub valor_total: Option<f64>,
    pub proveedor: String,
    pub documentacion: Option<String>,
}

/// Активные записи с необязательными фильтрами.
///
/// Текстовые фильтры - `LIKE '%v%'`, дата сравнивается без времени.
/// Значения всегда передаются параметрами.
pub fn list_query(filtro: &Filtro) -> Select<Entity> {
    let mut query = Entity::find().filter(Column::Activo.eq(true));

    let text_filters = [
        (Column::Presupuesto, &filtro.presupuesto),
        (Column::Unidad, &filtro.unidad),
        (Column::TipoBienServicio, &filtro.tipo_bien_servicio),
        (Column::Proveedor, &filtro.proveedor),
    ];
    for (column, value) in text_filters {
        if let Some(value) = value {
            query = query.filter(column.contains(value.as_str()));
        }
    }

    if let Some(fecha) = filtro.fecha_adquisicion {
        query = query.filter(Expr::cust_with_values(
            "date(fecha_adquisicion) = ?",
            [fecha.format("%Y-%m-%d").to_string()],
        ));
    }

    query
}

pub async fn list_active<C: ConnectionTrait>(db: &C, filtro: &Filtro) -> Result<Vec<Model>, DbErr> {
    list_query(filtro).all(db).await
}

/// Без фильтра по `activo`: деактивированные записи доступны по id
pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).one(db).await
}

/// Вставка; id берётся из результата самой вставки на том же соединении
pub async fn insert<C: ConnectionTrait>(db: &C, nuevo: &NuevoRequerimiento) -> Result<i32, DbErr> {
    let active = ActiveModel {
        id: NotSet,
        presupuesto: Set(nuevo.presupuesto.clone()),
        unidad: Set(nuevo.unidad.clone()),
        tipo_bien_servicio: Set(nuevo.tipo_bien_servicio.clone()),
        cantidad: Set(nuevo.cantidad),
        valor_unitario: Set(nuevo.valor_unitario),
        valor_total: Set(nuevo.valor_total),
        fecha_adquisicion: NotSet,
        proveedor: Set(nuevo.proveedor.clone()),
        documentacion: Set(nuevo.documentacion.clone()),
        activo: Set(true),
    };
    let result = Entity::insert(active).exec(db).await?;
    Ok(result.last_insert_id)
}

/// Частичное обновление; возвращает число затронутых строк
pub async fn update_fields<C: ConnectionTrait>(
    db: &C,
    id: i32,
    cambios: &[Cambio],
) -> Result<u64, DbErr> {
    let result = update_statement(id, cambios).exec(db).await?;
    Ok(result.rows_affected)
}

fn update_statement(id: i32, cambios: &[Cambio]) -> UpdateMany<Entity> {
    let mut update = Entity::update_many().filter(Column::Id.eq(id));
    for cambio in cambios {
        update = update.col_expr(cambio.campo.column(), Expr::value(cambio.valor.clone()));
    }
    update
}

pub async fn deactivate<C: ConnectionTrait>(db: &C, id: i32) -> Result<u64, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::Activo, Expr::value(false))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_requerimiento::campos::Campo;
    use sea_orm::{DbBackend, QueryTrait, Value};

    fn sql_and_values(filtro: &Filtro) -> (String, Vec<Value>) {
        let stmt = list_query(filtro).build(DbBackend::Sqlite);
        let values = stmt.values.map(|v| v.0).unwrap_or_default();
        (stmt.sql, values)
    }

    #[test]
    fn test_no_filters_only_active() {
        let (sql, values) = sql_and_values(&Filtro::default());
        assert!(sql.contains("\"activo\" = ?"), "{sql}");
        assert!(!sql.contains("LIKE"), "{sql}");
        assert_eq!(values, vec![Value::Bool(Some(true))]);
    }

    #[test]
    fn test_text_filters_are_bound_like_patterns() {
        let filtro = Filtro {
            presupuesto: Some("2024".into()),
            proveedor: Some("x' OR 1=1 --".into()),
            ..Default::default()
        };
        let (sql, values) = sql_and_values(&filtro);
        assert!(sql.contains("\"presupuesto\" LIKE ?"), "{sql}");
        assert!(sql.contains("\"proveedor\" LIKE ?"), "{sql}");
        assert!(!sql.contains("OR 1=1"), "{sql}");
        assert!(values.contains(&Value::from("%2024%".to_string())));
        assert!(values.contains(&Value::from("%x' OR 1=1 --%".to_string())));
    }

    #[test]
    fn test_date_filter_ignores_time_of_day() {
        let filtro = Filtro {
            fecha_adquisicion: NaiveDate::from_ymd_opt(2024, 2, 29),
            ..Default::default()
        };
        let (sql, values) = sql_and_values(&filtro);
        assert!(sql.contains("date(fecha_adquisicion) = ?"), "{sql}");
        assert!(values.contains(&Value::from("2024-02-29".to_string())));
    }

    #[test]
    fn test_all_filters_are_and_combined() {
        let filtro = Filtro {
            presupuesto: Some("a".into()),
            unidad: Some("b".into()),
            tipo_bien_servicio: Some("c".into()),
            fecha_adquisicion: NaiveDate::from_ymd_opt(2023, 1, 1),
            proveedor: Some("d".into()),
        };
        let (sql, values) = sql_and_values(&filtro);
        assert_eq!(sql.matches(" AND ").count(), 5, "{sql}");
        assert!(!sql.contains(" OR "), "{sql}");
        assert_eq!(values.len(), 6);
    }

    #[test]
    fn test_update_statement_uses_allow_listed_columns() {
        let cambios = vec![
            Cambio {
                campo: Campo::ValorTotal,
                valor: Value::Double(None),
            },
            Cambio {
                campo: Campo::TipoBienServicio,
                valor: Value::from("Servicio".to_string()),
            },
        ];
        let stmt = update_statement(7, &cambios).build(DbBackend::Sqlite);
        assert!(stmt.sql.starts_with("UPDATE \"Requerimientos\" SET"), "{}", stmt.sql);
        assert!(stmt.sql.contains("\"valor_total\" = ?"), "{}", stmt.sql);
        assert!(stmt.sql.contains("\"tipo_bien_servicio\" = ?"), "{}", stmt.sql);
        assert!(stmt.sql.contains("\"id\" = ?"), "{}", stmt.sql);
        assert!(!stmt.sql.contains("activo"), "{}", stmt.sql);
    }
}
