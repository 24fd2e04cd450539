pub mod create;
pub mod fields;
pub mod list;
pub mod remove;
pub mod update;

pub use create::handle_create_product;
pub use list::handle_list_products;
pub use remove::handle_delete_product;
pub use update::{handle_reactivate_product, handle_update_product};
