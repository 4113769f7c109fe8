pub mod tenant;

pub use tenant::MasjidRecord;
