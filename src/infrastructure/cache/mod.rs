//! Cache infrastructure - grades store backends

mod factory;
mod in_memory;
mod redis;

pub use factory::CacheBackend;
pub use in_memory::InMemoryCache;
pub use redis::RedisCache;
