//! Request and response DTOs for the API.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
