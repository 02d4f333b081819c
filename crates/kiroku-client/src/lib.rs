//! Client-side building blocks for the kiroku blog: session handling, the
//! authorized request client, a keyed request cache, admin forms, route
//! guarding and thumbnail URL resolution.

pub mod cache;
pub mod error;
pub mod forms;
pub mod guard;
pub mod request;
pub mod routes;
pub mod session;
pub mod thumbnail;

pub use cache::{CacheKey, CacheState, Mutation, RequestCache};
pub use error::ClientError;
pub use guard::{GuardDecision, RouteGuard};
pub use request::{ApiClient, Operation};
pub use routes::Route;
pub use session::{
    IdentityClient, Session, SessionProvider, SessionSource, SessionState, StaticSession,
};
pub use thumbnail::{PublicUrlSource, StoragePublicUrl, ThumbnailResolver};
