//! HTTP 处理器模块

pub mod admin;
pub mod auth;
pub mod chirp;
pub mod health;
pub mod user;
pub mod webhook;

use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON 请求体提取器，解析后立即执行 `validator` 校验
///
/// 解析失败返回 400，校验失败返回 400 并带上规则提示
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
{
    /// 从已读取的请求体解析并校验，错误映射与提取器一致
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        let Json(value) = Json::<T>::from_bytes(bytes)
            .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;
        validated(value)
    }
}

fn validated<T: Validate>(value: T) -> Result<ValidatedJson<T>, AppError> {
    value
        .validate()
        .map_err(|e| AppError::Validation(validation_message(&e)))?;
    Ok(ValidatedJson(value))
}

/// 规则自带的提示优先，没有提示时回退到 `字段: 规则码`
fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;

        validated(value)
    }
}
