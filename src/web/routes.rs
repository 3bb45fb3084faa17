// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, auth_handlers, cart_handlers, menu_handlers, mw_admin, mw_auth,
        order_handlers, user_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::path::Path;
use tower_http::services::ServeDir;

pub fn create_router(app_state: AppState, upload_dir: &Path) -> Router {
    // --- Rotas Públicas ---
    // Registo/login e leitura do catálogo não exigem token
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth_handlers::handle_register))
        .route("/api/auth/login", post(auth_handlers::handle_login))
        .route(
            "/api/auth/forgot-password",
            post(auth_handlers::handle_forgot_password),
        )
        .route(
            "/api/auth/reset-password/{token}",
            put(auth_handlers::handle_reset_password),
        )
        .route("/api/menu", get(menu_handlers::handle_list_menu))
        .route("/api/menu/search", get(menu_handlers::handle_search_menu))
        .route(
            "/api/menu/categories",
            get(menu_handlers::handle_list_categories),
        )
        .route("/api/menu/{id}", get(menu_handlers::handle_get_menu_item));

    // --- Rotas de Admin ---
    // Exigem login E role admin (mw_auth é aplicado no router pai)
    let admin_routes = Router::new()
        .route("/api/menu", post(admin_handlers::handle_create_item))
        .route(
            "/api/menu/{id}",
            put(admin_handlers::handle_update_item).delete(admin_handlers::handle_delete_item),
        )
        .route(
            "/api/menu/{id}/availability",
            patch(admin_handlers::handle_toggle_availability),
        )
        .route(
            "/api/menu/categories",
            post(admin_handlers::handle_create_category),
        )
        .route(
            "/api/menu/categories/{id}",
            put(admin_handlers::handle_update_category)
                .delete(admin_handlers::handle_delete_category),
        )
        .route(
            "/api/orders/admin/all",
            get(order_handlers::handle_list_all_orders),
        )
        .route(
            "/api/orders/admin/stats",
            get(order_handlers::handle_order_stats),
        )
        .route(
            "/api/orders/{id}/status",
            put(order_handlers::handle_update_status),
        )
        .route("/api/users", get(user_handlers::handle_list_users))
        .route("/api/users/{id}/role", put(user_handlers::handle_update_role))
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Rotas Autenticadas ---
    // Exigem *pelo menos* login
    let authenticated_routes = Router::new()
        .route("/api/auth/me", get(auth_handlers::handle_me))
        .route(
            "/api/cart",
            get(cart_handlers::handle_get_cart).delete(cart_handlers::handle_clear_cart),
        )
        .route("/api/cart/items", post(cart_handlers::handle_add_item))
        .route(
            "/api/cart/items/{menu_item_id}",
            put(cart_handlers::handle_update_quantity).delete(cart_handlers::handle_remove_item),
        )
        .route(
            "/api/orders",
            post(order_handlers::handle_place_order).get(order_handlers::handle_list_my_orders),
        )
        .route("/api/orders/{id}", get(order_handlers::handle_get_order))
        .route(
            "/api/orders/{id}/cancel",
            put(order_handlers::handle_cancel_order),
        )
        .route(
            "/api/users/profile",
            get(user_handlers::handle_get_profile).put(user_handlers::handle_update_profile),
        )
        .route(
            "/api/users/password",
            put(user_handlers::handle_change_password),
        )
        .route(
            "/api/users/avatar",
            post(user_handlers::handle_upload_avatar).delete(user_handlers::handle_delete_avatar),
        )
        .merge(admin_routes)
        // Aplica o require_auth a TODAS as rotas acima (incluindo as de admin)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        // As imagens gravadas em disco são servidas diretamente daqui
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .with_state(app_state)
}
