pub mod api_key;
pub mod request_id;

pub use api_key::require_api_key;
pub use request_id::{Ctx, REQUEST_ID_HEADER};
