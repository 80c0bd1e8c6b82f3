// Adapters layer: concrete implementations for external systems (supplier API, file storage).

pub mod http;
pub mod storage;
