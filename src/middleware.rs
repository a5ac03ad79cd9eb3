//! HTTP 中间件
//! 应用状态、请求追踪、静态文件访问计数

use crate::{
    auth::{PasswordHasher, RefreshTokenStore, TokenSigner},
    config::AppConfig,
    error::AppError,
    repository::{ChirpRepository, RefreshTokenRepository, UserRepository},
    services::{ChirpService, SessionService},
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Duration;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

tokio::task_local! {
    /// 当前请求的 request_id，错误响应体从这里读取
    pub static REQUEST_ID: String;
}

/// 应用状态
///
/// 存储通过 trait 对象访问，生产环境是 PgStore，测试与 `--memory` 是 MemoryStore
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub hasher: Arc<PasswordHasher>,
    pub token_signer: Arc<TokenSigner>,
    pub session_service: Arc<SessionService>,
    pub chirp_service: Arc<ChirpService>,
    /// `/app` 静态文件访问次数
    pub file_server_hits: AtomicU64,
}

impl AppState {
    /// 用同一个存储实现装配所有服务
    pub fn new<S>(config: AppConfig, store: Arc<S>) -> Result<Self, AppError>
    where
        S: UserRepository + ChirpRepository + RefreshTokenRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let chirps: Arc<dyn ChirpRepository> = store.clone();
        let refresh_tokens: Arc<dyn RefreshTokenRepository> = store;

        let hasher = Arc::new(PasswordHasher::from_config(&config.security)?);
        let token_signer = Arc::new(TokenSigner::from_config(&config)?);

        let session_service = Arc::new(SessionService::new(
            users.clone(),
            hasher.clone(),
            token_signer.clone(),
            RefreshTokenStore::new(
                refresh_tokens.clone(),
                Duration::seconds(config.security.refresh_token_exp_secs as i64),
            ),
            Duration::seconds(config.security.access_token_exp_secs as i64),
        ));
        let chirp_service = Arc::new(ChirpService::new(chirps));

        Ok(Self {
            config,
            users,
            refresh_tokens,
            hasher,
            token_signer,
            session_service,
            chirp_service,
            file_server_hits: AtomicU64::new(0),
        })
    }

    pub fn hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn reset_hits(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 指标标签只使用静态字符串
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            _ => "OTHER",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            409 => "409",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            headers.insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// 静态文件访问计数
pub async fn hit_counter_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    state.file_server_hits.fetch_add(1, Ordering::Relaxed);
    next.run(req).await
}
