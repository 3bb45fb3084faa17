// src/models/cart.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Cabeçalho do carrinho (tabela 'carts'; um por utilizador).
#[derive(Debug, Clone, FromRow)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha do carrinho: snapshot de nome/preço tirado no momento do add.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "menuItem")]
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub subtotal: f64,
}

// Carrinho completo, tal como vai na resposta.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub total_amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub menu_item_id: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityBody {
    pub quantity: Option<i64>,
}
