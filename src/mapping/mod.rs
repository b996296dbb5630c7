pub mod mapper;
pub mod normalize;

pub use mapper::{map_fields, resolve_declared_language, MappedFields};
pub use normalize::normalize_key;
