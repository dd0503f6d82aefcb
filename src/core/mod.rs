pub mod entity;
pub mod error;

pub use entity::{MessageBody, MessageEntity, MessageHeader};
pub use error::{Result, StoreError};
