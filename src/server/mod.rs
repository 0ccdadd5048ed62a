pub mod dto;
pub mod response;
mod router;
mod schema;
pub mod validation;

pub use router::{AppState, create_router};
pub use schema::schema_router;
