// src/models/order.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Estados possíveis de um pedido ---
pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_PREPARING: &str = "Preparing";
pub const STATUS_READY: &str = "Ready";
pub const STATUS_COMPLETED: &str = "Completed";
pub const STATUS_CANCELLED: &str = "Cancelled";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PREPARING,
    STATUS_READY,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

// Cabeçalho do pedido (tabela 'orders').
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub total_amount: f64,
    pub status: String,
    pub special_instructions: String,
    pub order_date: DateTime<Utc>,
    pub estimated_ready_time: Option<DateTime<Utc>>,
    pub actual_ready_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Linha do pedido: cópia imutável da linha do carrinho no momento do place.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "menuItem")]
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub subtotal: f64,
}

// Pedido completo com as linhas, tal como vai na resposta.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: String,
    pub special_instructions: String,
    pub order_date: DateTime<Utc>,
    pub estimated_ready_time: Option<DateTime<Utc>>,
    pub actual_ready_time: Option<DateTime<Utc>>,
}

impl OrderView {
    pub fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        OrderView {
            id: order.id,
            user_id: order.user_id,
            items,
            total_amount: order.total_amount,
            status: order.status,
            special_instructions: order.special_instructions,
            order_date: order.order_date,
            estimated_ready_time: order.estimated_ready_time,
            actual_ready_time: order.actual_ready_time,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    #[serde(default)]
    pub status: String,
}

// Filtros do GET /api/orders (utilizador)
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// Filtros do GET /api/orders/admin/all e /admin/stats
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderQuery {
    pub status: Option<String>,
    pub start_date: Option<String>, // YYYY-MM-DD
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// --- Agregações para as estatísticas ---

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStat {
    pub status: String,
    pub count: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    pub name: String,
    pub total_ordered: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub day: String, // YYYY-MM-DD
    pub count: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub overall: OverallStats,
    pub by_status: Vec<StatusStat>,
    pub popular_items: Vec<PopularItem>,
    pub by_date: Vec<DailyStat>,
}
