pub mod form;
pub mod headers;
pub mod json_response;
pub mod path;
pub mod upload;

// Re-export commonly used utilities
pub use form::{FormData, UploadedFile, parse_form};
pub use headers::*;
pub use json_response::*;
pub use path::path_id;
pub use upload::store_upload;
