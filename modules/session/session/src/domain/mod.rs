pub mod error;
pub mod repo;
pub mod state;
pub mod token;
pub mod validator;
