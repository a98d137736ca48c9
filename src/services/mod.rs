pub mod accounts;
pub mod todos;
