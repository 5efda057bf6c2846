use std::sync::Arc;

use crate::storage::AnalysisCache;

#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<AnalysisCache>,
    /// Tier-list rows with fewer games are hidden.
    pub min_games: u32,
}
