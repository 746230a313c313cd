pub mod auth;
pub mod store;
pub mod uploader;

pub use auth::{AuthSession, AuthUser, IdentityProvider, RestIdentityProvider};
pub use store::{DocumentStore, RestDocumentStore};
pub use uploader::{CloudinaryUploader, ImageUploader};
