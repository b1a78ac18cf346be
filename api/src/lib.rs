use std::sync::Arc;

use config::ServerConfig;
use store::Store;

pub mod blog;
pub mod config;
pub mod error;
pub mod identity;
pub mod json;
pub mod notification;
pub mod schema;
pub mod store;

#[derive(Clone)]
pub struct App {
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
}
