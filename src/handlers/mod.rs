// handlers/mod.rs - HTTP handlers
//
// system:  service endpoints outside any masjid scope (/, /health)
// context: whoami-style view of the resolved masjid context, mounted in every
//          guarded route group (/api/a, /api/t, /api/u)

pub mod context;
pub mod system;
