pub mod auth;
pub mod health;
pub mod todos;
pub mod web;
