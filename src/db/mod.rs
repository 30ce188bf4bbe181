//! Connection to the MongoDB database holding generation runs and questions.

use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

pub const APP_NAME: &str = "qnabase-server";

/// Handle on the configured database. Cloning shares the client pool.
#[derive(Clone)]
pub struct Database {
    inner: mongodb::Database,
}

impl Database {
    /// Connects and pings once; an unreachable server is a startup error.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let options = client_options(config).await?;
        let client = Client::with_options(options)?;
        let database = Self {
            inner: client.database(&config.mongo_db_name),
        };

        database.ping().await?;
        log::info!(
            "Connected to MongoDB database '{}' (pool {}..{})",
            config.mongo_db_name,
            config.mongo_min_pool_size,
            config.mongo_max_pool_size
        );

        Ok(database)
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.inner.collection(name)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.ping().await.map_err(|err| {
            log::warn!("MongoDB ping to '{}' failed: {}", self.name(), err);
            AppError::DatabaseError(format!("database '{}' unreachable: {}", self.name(), err))
        })
    }

    async fn ping(&self) -> mongodb::error::Result<()> {
        self.inner.run_command(doc! { "ping": 1 }).await.map(|_| ())
    }
}

/// Parses the connection string and applies the pool and timeout settings.
pub async fn client_options(config: &Config) -> AppResult<ClientOptions> {
    let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
    apply_settings(&mut options, config);
    Ok(options)
}

fn apply_settings(options: &mut ClientOptions, config: &Config) {
    let timeout = Duration::from_secs(config.mongo_timeout_secs);

    options.app_name = Some(APP_NAME.to_string());
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
    options.max_pool_size = Some(config.mongo_max_pool_size);
    options.min_pool_size = Some(config.mongo_min_pool_size.min(config.mongo_max_pool_size));
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);
}
