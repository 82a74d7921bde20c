//! Application state wiring all components together.
//!
//! The dispatcher is generic over store/backend/gateway traits; AppState
//! pins it to the concrete infra implementations and owns the handles the
//! poll loop needs.

use std::sync::Arc;

use fishcart_core::machine::dispatcher::Dispatcher;
use fishcart_infra::config::load_config;
use fishcart_infra::sqlite::pool::DatabasePool;
use fishcart_infra::sqlite::session::SqliteSessionStore;
use fishcart_infra::strapi::StrapiCommerce;
use fishcart_infra::telegram::TelegramGateway;
use fishcart_types::config::BotConfig;

/// Dispatcher generics pinned to the infra implementations.
pub type ConcreteDispatcher = Dispatcher<SqliteSessionStore, StrapiCommerce, TelegramGateway>;

/// Shared application state for the `run` and `status` commands.
#[derive(Clone)]
pub struct AppState {
    pub config: BotConfig,
    pub dispatcher: ConcreteDispatcher,
    pub gateway: Arc<TelegramGateway>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Load config, open the database, and wire the dispatcher.
    pub async fn init() -> anyhow::Result<Self> {
        let config = load_config()?;

        // `sqlite://` URLs create the file on demand but not its directory.
        if let Some(path) = config.database_url.strip_prefix("sqlite://") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let db_pool = DatabasePool::new(&config.database_url).await?;

        let store = Arc::new(SqliteSessionStore::new(db_pool.clone()));
        let backend = Arc::new(StrapiCommerce::new(
            config.commerce_base_url(),
            config.api_token.clone(),
        ));
        let gateway = Arc::new(TelegramGateway::new(config.tg_token.clone()));

        let dispatcher = Dispatcher::new(store, backend, Arc::clone(&gateway));

        Ok(Self {
            config,
            dispatcher,
            gateway,
            db_pool,
        })
    }
}
