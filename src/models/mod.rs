// src/models/mod.rs
pub mod cart;
pub mod category;
pub mod menu_item;
pub mod order;
pub mod user;
