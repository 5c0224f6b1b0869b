use contracts::domain::a002_historial_requerimiento::aggregate::HistorialRequerimiento;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "HistorialRequerimientos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub requerimientos_id: i32,
    pub fecha_cambio: chrono::NaiveDateTime,
    pub detalles: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for HistorialRequerimiento {
    fn from(m: Model) -> Self {
        HistorialRequerimiento {
            id: m.id,
            fecha_cambio: m.fecha_cambio,
            detalles: m.detalles,
        }
    }
}

/// Журнал по requerimiento, сначала самые свежие записи
pub async fn list_by_requerimiento<C: ConnectionTrait>(
    db: &C,
    requerimiento_id: i32,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::RequerimientosId.eq(requerimiento_id))
        .order_by_desc(Column::FechaCambio)
        .order_by_desc(Column::Id)
        .all(db)
        .await
}
