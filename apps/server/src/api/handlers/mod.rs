pub mod documents;
pub mod health;
