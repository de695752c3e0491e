pub mod expiring_cache;
pub mod http_client;
