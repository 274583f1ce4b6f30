pub mod models;
pub mod pool;
pub mod repository;

pub use models::StoredMessage;
pub use pool::DbPool;
pub use repository::MessageRepository;
