use redis::AsyncCommands;
use redis::Client;
use tokio::sync::mpsc;

use crate::config::EngineConfig;
use crate::db::{ProfileKey, ProfileStore};
use crate::error::AppError;
use crate::error::AppResult;
use crate::models::ProfileSnapshot;

/// Creates a Redis client for the profile store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous snapshot writes
struct SnapshotWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed profile snapshot store
///
/// Reads go straight to Redis. Writes are queued to a background task so saving a
/// snapshot never delays the request that built it.
#[derive(Clone)]
pub struct RedisProfileStore {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<SnapshotWriteMessage>,
    ttl: u64,
}

/// Handle for gracefully shutting down the snapshot writer
pub struct StoreWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl StoreWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Profile store writer shutdown signal sent");
    }
}

impl RedisProfileStore {
    /// Creates the store and spawns its background writer
    ///
    /// Snapshots expire `ttl` seconds after they are written.
    pub async fn new(redis_client: Client, ttl: u64) -> (Self, StoreWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::writer_task(client, write_rx, shutdown_rx).await;
        });

        let store = Self {
            redis_client,
            write_tx,
            ttl,
        };

        (store, StoreWriterHandle { shutdown_tx })
    }

    /// Connects using `redis_url` and `profile_ttl_secs` from the configuration
    pub async fn from_config(config: &EngineConfig) -> anyhow::Result<(Self, StoreWriterHandle)> {
        let client = create_redis_client(&config.redis_url)?;
        Ok(Self::new(client, config.profile_ttl_secs).await)
    }

    /// Writes queued snapshots until shutdown, then drains the queue
    async fn writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<SnapshotWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Profile store writer started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    let key = msg.key.clone();
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, key = %key, "Failed to write profile snapshot");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // no new sends can be observed after this point, drain what is queued
                    write_rx.close();
                    let mut flushed = 0;

                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(
                                error = %e,
                                "Failed to flush profile snapshot during shutdown"
                            );
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed = flushed, "Profile store writer stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: SnapshotWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Queues a snapshot write without waiting for Redis
    pub fn set_in_background(&self, key: &ProfileKey, snapshot: &ProfileSnapshot) {
        let json = match serde_json::to_string(snapshot) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Profile snapshot serialization error");
                return;
            }
        };

        let msg = SnapshotWriteMessage {
            key: key.to_string(),
            value: json,
            ttl: self.ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to queue profile snapshot write");
        }
    }
}

#[async_trait::async_trait]
impl ProfileStore for RedisProfileStore {
    async fn load(&self, key: &ProfileKey) -> AppResult<Option<ProfileSnapshot>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let snapshot = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Profile snapshot deserialization error: {}", e))
                })?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &ProfileKey, snapshot: &ProfileSnapshot) -> AppResult<()> {
        self.set_in_background(key, snapshot);
        Ok(())
    }
}
