mod header;
mod parts;

pub use header::JwtHeader;
pub use parts::JwtParts;
