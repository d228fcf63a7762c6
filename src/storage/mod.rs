pub mod json_backend;
pub mod memory;

pub use json_backend::JsonBackend;
pub use memory::MemoryBackend;
