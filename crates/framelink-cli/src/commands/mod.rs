pub mod common;
pub mod login;
pub mod revoke;
pub mod state;
pub mod terminals;
pub mod upload;
