use std::sync::Arc;

use crate::store::QuestionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<QuestionStore>,
}
