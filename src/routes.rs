//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};

use crate::{
    auth::jwt_auth_middleware,
    handlers,
    middleware::{hit_counter_middleware, request_tracking_middleware, AppState},
};

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let require_auth = from_fn_with_state(state.token_signer.clone(), jwt_auth_middleware);

    // 静态文件，每次访问计数
    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.server.static_dir))
        .layer(from_fn_with_state(state.clone(), hit_counter_middleware));

    // 公开端点
    let public_routes = Router::new()
        .route("/api/healthz", get(handlers::health::readiness))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/refresh", post(handlers::auth::refresh))
        .route("/api/revoke", post(handlers::auth::revoke))
        .route("/api/polka/webhooks", post(handlers::webhook::polka_webhook))
        .route("/admin/metrics", get(handlers::admin::metrics))
        .route("/admin/reset", post(handlers::admin::reset));

    // 同一路径上读公开、写需认证
    let mixed_routes = Router::new()
        .route(
            "/api/users",
            post(handlers::user::create_user)
                .merge(put(handlers::user::update_user).route_layer(require_auth.clone())),
        )
        .route(
            "/api/chirps",
            get(handlers::chirp::list_chirps)
                .merge(post(handlers::chirp::create_chirp).route_layer(require_auth.clone())),
        )
        .route(
            "/api/chirps/{chirp_id}",
            get(handlers::chirp::get_chirp)
                .merge(delete(handlers::chirp::delete_chirp).route_layer(require_auth)),
        );

    Router::new()
        .merge(public_routes)
        .merge(mixed_routes)
        .with_state(state)
        .merge(file_server)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(from_fn(request_tracking_middleware))
}
