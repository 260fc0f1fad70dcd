// Adapters layer: concrete implementations for external systems (filesystem storage, export formats).

pub mod export;
pub mod storage;
