pub mod idle;
pub mod permission;
pub mod pin_login;
pub mod session;
pub mod transition;
