pub mod host;
pub mod resolver;

pub use host::{is_local_or_ip, normalize_host, subdomain_slug};
pub use resolver::{Resolution, ResolutionInput, ResolutionSource, TenantResolver};
