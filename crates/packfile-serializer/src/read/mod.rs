//! Container-to-graph deserialization, the inverse of [`crate::write`].

mod context;
mod deserializer;


pub use context::ReadContext;
pub use deserializer::deserialize;
