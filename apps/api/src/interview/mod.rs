pub mod evaluator;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod question_bank;
pub mod random;
pub mod service;
pub mod session;
pub mod store;
pub mod summary;
