pub mod comment;
pub mod like;
pub mod models;
pub mod profile;
pub mod routes;
