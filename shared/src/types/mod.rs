pub mod json_error;
pub mod jwt;
pub mod login;
pub mod product;
pub mod register;
pub mod server_config;
pub mod user;

pub use self::json_error::ErrorResponse;
pub use self::jwt::{JwtClaims, Role};
pub use self::login::{LoginData, LoginError, LoginResponse, LogoutResponse};
pub use self::product::{
    MessageResponse, Product, ProductData, ProductError, ProductResponse, ReactivateResponse,
};
pub use self::register::{RegistrationData, RegistrationError};
pub use self::user::{Image, ProfileUpdateData, UserProfile, UserResponse};
