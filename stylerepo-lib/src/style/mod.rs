pub mod cssom;
pub mod engine;
pub mod serializer;
