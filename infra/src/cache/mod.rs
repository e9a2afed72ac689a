//! Cache module for Redis-backed OTP storage
//!
//! This module provides the Redis client with connection retry logic and the
//! OTP store built on it.

pub mod otp_storage;
pub mod redis_client;


pub use otp_storage::RedisOtpStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use om_shared::config::CacheConfig;
