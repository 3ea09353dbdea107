pub mod record;
pub mod route;
pub mod search_path;

pub use record::*;
pub use route::*;
pub use search_path::*;
