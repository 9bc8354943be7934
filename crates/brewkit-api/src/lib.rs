// brewkit-api: Async client for the brewkit document store.
//
// Three operations cover everything the store needs: list a collection,
// create-or-overwrite a document by id, and hold a live ordered query open.
// `RestGateway` speaks HTTP + WebSocket; `MemoryGateway` keeps everything
// in-process for tests and demos.

pub mod document;
pub mod error;
pub mod gateway;
pub mod live;
pub mod memory;
pub mod rest;
pub mod transport;

pub use document::{Direction, Document, Fields, ListenQuery};
pub use error::Error;
pub use gateway::{Gateway, LiveEvent, LiveQuery};
pub use live::ReconnectConfig;
pub use memory::MemoryGateway;
pub use rest::RestGateway;
pub use transport::GatewayConfig;
