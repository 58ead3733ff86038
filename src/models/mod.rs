mod api_response;
pub use api_response::*;

mod app_state;
pub use app_state::*;

mod credential;
pub use credential::*;

mod error;
pub use error::*;

mod request;
pub use request::*;

mod secret_string;
pub use secret_string::*;
