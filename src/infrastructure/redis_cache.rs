use std::time::Duration;

use redis::Commands;

use crate::domain::errors::DomainError;
use crate::domain::ports::EntityCache;

fn unavailable(e: redis::RedisError) -> DomainError {
    DomainError::Unavailable {
        service: "cache",
        reason: e.to_string(),
    }
}

/// Blocking Redis adapter for the entity caches. Opening a connection per
/// call keeps this layer stateless; the services treat every error from here
/// as a degraded read, never a failure.
#[derive(Clone)]
pub struct RedisEntityCache {
    client: redis::Client,
}

impl RedisEntityCache {
    pub fn new(redis_url: &str) -> Result<Self, DomainError> {
        let client = redis::Client::open(redis_url).map_err(unavailable)?;
        Ok(Self { client })
    }
}

impl EntityCache for RedisEntityCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let mut conn = self.client.get_connection().map_err(unavailable)?;
        conn.get(key).map_err(unavailable)
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.client.get_connection().map_err(unavailable)?;
        conn.set_ex(key, value, ttl.as_secs()).map_err(unavailable)
    }

    fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.client.get_connection().map_err(unavailable)?;
        conn.del(key).map_err(unavailable)
    }
}
