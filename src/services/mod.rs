//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services use infrastructure adapters to perform I/O operations.

pub mod push_service;
pub mod resolver;

// Re-export commonly used types
pub use push_service::PushService;
pub use resolver::ArgumentResolver;
