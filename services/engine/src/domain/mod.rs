pub mod gateway;
pub mod idle;
pub mod machine;
pub mod repository;
pub mod types;
