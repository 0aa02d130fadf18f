pub mod codec;
pub mod error;
pub mod note;
pub mod paths;
pub mod repository;
pub mod schema;
pub mod tags;
