pub mod config;
pub mod conversion;
pub mod definition;
pub mod handle;
pub mod index;

pub use config::*;
pub use conversion::*;
pub use definition::*;
pub use handle::*;
pub use index::*;
