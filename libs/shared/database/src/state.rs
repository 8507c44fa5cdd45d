use std::sync::Arc;

use shared_config::AppConfig;

use crate::supabase::SupabaseClient;

/// Process-wide state handed to every router. Built once at startup; the
/// database client inside owns the connection pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: SupabaseClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let db = SupabaseClient::new(&config);
        Self { config, db }
    }

    pub fn shared(config: AppConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }
}
