use std::sync::Arc;

use axum::extract::FromRef;

use crate::services::export::ExportService;

#[derive(Clone)]
pub struct AppState {
    pub export: Arc<ExportService>,
}

impl FromRef<AppState> for Arc<ExportService> {
    fn from_ref(state: &AppState) -> Self {
        state.export.clone()
    }
}
