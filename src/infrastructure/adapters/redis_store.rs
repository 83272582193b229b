//! Redis-backed document store
//!
//! Each document lives at `{prefix}:doc:{collection}:{id}` and its ID is kept
//! in the set `{prefix}:idx:{collection}` so collections can be listed
//! without `KEYS`. The two namespaces never overlap, whatever the ID. Writes
//! touch both keys atomically.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, Script};
use tracing::info;

use crate::application::ports::DocumentBackend;
use crate::shared::error::{AppError, AppResult};

/// Compare-and-swap of one document.
///
/// KEYS: document key, index set. ARGV: `1` when a previous value is
/// expected (`0` for "must be absent"), expected bytes, new bytes, ID.
const SWAP_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '0' then
  if current then return 0 end
else
  if (not current) or current ~= ARGV[2] then return 0 end
end
redis.call('SET', KEYS[1], ARGV[3])
redis.call('SADD', KEYS[2], ARGV[4])
return 1
"#;

#[derive(Clone)]
pub struct RedisDocumentStore {
    manager: ConnectionManager,
    prefix: String,
    swap_script: Script,
}

impl RedisDocumentStore {
    pub async fn connect(redis_url: &str, prefix: &str) -> AppResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::Config(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Store(format!("Failed to create Redis connection manager: {}", e)))?;

        info!(prefix = %prefix, "Connected to Redis document store");

        Ok(Self {
            manager,
            prefix: prefix.to_string(),
            swap_script: Script::new(SWAP_SCRIPT),
        })
    }

    fn document_key(&self, collection: &str, id: &str) -> String {
        document_key(&self.prefix, collection, id)
    }

    fn index_key(&self, collection: &str) -> String {
        index_key(&self.prefix, collection)
    }
}

fn document_key(prefix: &str, collection: &str, id: &str) -> String {
    format!("{}:doc:{}:{}", prefix, collection, id)
}

fn index_key(prefix: &str, collection: &str) -> String {
    format!("{}:idx:{}", prefix, collection)
}

#[async_trait]
impl DocumentBackend for RedisDocumentStore {
    async fn fetch(&self, collection: &str, id: &str) -> AppResult<Option<Vec<u8>>> {
        let mut conn = self.manager.clone();
        let data: Option<Vec<u8>> = conn.get(self.document_key(collection, id)).await?;
        Ok(data)
    }

    async fn fetch_all(&self, collection: &str) -> AppResult<Vec<(String, Vec<u8>)>> {
        let mut conn = self.manager.clone();
        let ids: Vec<String> = conn.smembers(self.index_key(collection)).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.document_key(collection, id)).collect();
        let documents: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        // An ID without a document is skipped rather than failing the listing
        Ok(ids
            .into_iter()
            .zip(documents)
            .filter_map(|(id, doc)| doc.map(|doc| (id, doc)))
            .collect())
    }

    async fn swap(
        &self,
        collection: &str,
        id: &str,
        expected: Option<&[u8]>,
        document: Vec<u8>,
    ) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        let (flag, expected) = match expected {
            Some(bytes) => ("1", bytes.to_vec()),
            None => ("0", Vec::new()),
        };

        let written: i64 = self
            .swap_script
            .key(self.document_key(collection, id))
            .key(self.index_key(collection))
            .arg(flag)
            .arg(expected)
            .arg(document)
            .arg(id)
            .invoke_async(&mut conn)
            .await?;

        Ok(written == 1)
    }

    async fn remove(&self, collection: &str, id: &str) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        let (deleted,): (i64,) = redis::pipe()
            .atomic()
            .del(self.document_key(collection, id))
            .srem(self.index_key(collection), id)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(deleted > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
