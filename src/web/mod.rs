// src/web/mod.rs
pub mod admin_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod menu_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod order_handlers;
pub mod routes;
pub mod user_handlers;
