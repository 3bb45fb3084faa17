// src/notify.rs
//
// Envio de email: colaborador externo, melhor-esforço.
// As falhas são logadas e nunca falham o pedido HTTP (exceto no
// forgot-password, onde o chamador decide o que fazer).
use crate::error::{AppError, AppResult};
use crate::models::order::OrderView;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

// Implementação por omissão: apenas loga a mensagem.
// O transporte SMTP real fica atrás da mesma trait.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        tracing::info!(
            "📧 [email simulado] para={} assunto={:?} ({} bytes de corpo)",
            to,
            subject,
            html.len()
        );
        Ok(())
    }
}

// Dispara o envio em background sem bloquear a resposta HTTP.
pub fn spawn_send(mailer: Arc<dyn Mailer>, to: String, subject: String, html: String) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, &subject, &html).await {
            tracing::error!("Falha ao enviar email para {}: {:?}", to, e);
        }
    });
}

// --- Composição das mensagens ---

pub fn order_confirmation_email(user_name: &str, order: &OrderView) -> (String, String) {
    let subject = format!("Order Confirmation - #{}", short_id(&order.id));
    let ready = order
        .estimated_ready_time
        .map(format_time)
        .unwrap_or_else(|| "-".to_string());

    let mut lines = String::new();
    for item in &order.items {
        lines.push_str(&format!(
            "<li>{} x{} — {:.2}</li>",
            item.name, item.quantity, item.subtotal
        ));
    }

    let html = format!(
        "<h2>Thank you for your order, {user_name}!</h2>\
         <p>Order <strong>#{id}</strong> has been received.</p>\
         <ul>{lines}</ul>\
         <p>Total: <strong>{total:.2}</strong></p>\
         <p>Estimated ready time: {ready}</p>",
        id = short_id(&order.id),
        total = order.total_amount,
    );
    (subject, html)
}

pub fn order_status_email(user_name: &str, order_id: &str, status: &str) -> (String, String) {
    let subject = format!("Order #{} is {}", short_id(order_id), status);
    let html = format!(
        "<h2>Hi {user_name},</h2>\
         <p>Your order <strong>#{id}</strong> is now <strong>{status}</strong>.</p>\
         <p>Please pick it up at the counter.</p>",
        id = short_id(order_id),
    );
    (subject, html)
}

pub fn password_reset_email(user_name: &str, reset_token: &str) -> (String, String) {
    let subject = "Password Reset Request".to_string();
    let html = format!(
        "<h2>Hi {user_name},</h2>\
         <p>You requested a password reset. Use the token below within 1 hour:</p>\
         <p><code>{reset_token}</code></p>\
         <p>If you did not request this, ignore this email.</p>"
    );
    (subject, html)
}

fn short_id(id: &str) -> &str {
    // Os UUIDs completos são ruidosos num assunto de email
    &id[..id.len().min(8)]
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%H:%M").to_string()
}

pub fn dependency_error(detail: impl std::fmt::Display) -> AppError {
    AppError::Dependency(format!("Email could not be sent. Please try again later. ({detail})"))
}
