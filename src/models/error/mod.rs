mod api;
pub use api::*;

mod repository_error;
pub use repository_error::*;
