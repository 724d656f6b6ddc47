pub mod auth;
pub use auth::AuthService;
pub mod status;
pub use status::StatusService;
pub mod zapi;
pub use zapi::ZapiClient;
