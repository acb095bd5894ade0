pub mod filter;
pub mod record;
pub mod template;

pub use filter::*;
pub use record::*;
pub use template::*;
