// src/models/menu_item.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Linha da tabela 'menu_items' tal como sai da DB.
#[derive(Debug, Clone, FromRow)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_id: String,
    pub price: f64,
    pub is_available: bool,
    pub preparation_time: i64, // minutos
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha do JOIN com 'categories', para as respostas que mostram a categoria.
#[derive(Debug, Clone, FromRow)]
pub struct MenuItemRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_id: String,
    pub category_name: String,
    pub price: f64,
    pub is_available: bool,
    pub preparation_time: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Forma serializada de um item do menu: a categoria vai aninhada,
// como o cliente espera.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: CategoryRef,
    pub price: f64,
    pub is_available: bool,
    pub preparation_time: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

impl From<MenuItemRow> for MenuItemView {
    fn from(row: MenuItemRow) -> Self {
        MenuItemView {
            id: row.id,
            name: row.name,
            description: row.description,
            category: CategoryRef {
                id: row.category_id,
                name: row.category_name,
            },
            price: row.price,
            is_available: row.is_available,
            preparation_time: row.preparation_time,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

// Filtros do GET /api/menu
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuListQuery {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub is_available: Option<bool>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// Campos textuais de um create/update de item (vêm do multipart)
#[derive(Debug, Default)]
pub struct MenuItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub preparation_time: Option<i64>,
    pub is_available: Option<bool>,
}
