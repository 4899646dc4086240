mod cache;
mod lock;
mod mutex;
mod status;

pub use cache::*;
pub use lock::*;
pub(crate) use mutex::*;
pub use status::*;
