pub mod error;
pub mod masjid_context;
pub mod response;

pub use error::ContextError;
pub use masjid_context::{
    masjid_context_middleware, ActiveMasjid, ContextServices, LegacyContext, ResolvedContext, RouteGuard,
};
pub use response::{ApiResponse, ApiResult};
