pub mod get;
pub mod profile;

pub use get::{handle_get_user, handle_list_users};
pub use profile::handle_update_profile;
