pub mod db;
pub mod pin;
