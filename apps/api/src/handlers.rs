pub mod billing;
pub mod boards;
pub mod health;
pub mod retros;
