use sea_orm::DatabaseConnection;

/// Состояние, доступное всем обработчикам через `State<AppState>`
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}
