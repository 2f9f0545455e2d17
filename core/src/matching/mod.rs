//! # Contract Matching
//!
//! Resolves a concrete request/response pair to the contract element it
//! corresponds to. Each matcher is a pure lookup over the borrowed contract.
//!
//! - **server**: request URI -> declared server and server-relative path.
//! - **path**: server-relative path -> path template.
//! - **status**: status code -> declared response (exact code, then range).
//! - **content**: content type -> media type binding.

pub mod content;
pub mod path;
pub mod server;
pub mod status;

pub use content::{match_content_type, media_type_essence};
pub use path::match_path;
pub use server::{resolve_server, ServerMatch};
pub use status::{match_status, range_token};
