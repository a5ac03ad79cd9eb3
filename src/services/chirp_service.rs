//! Chirp 服务：校验、脏话过滤、按作者删除

use crate::{
    error::AppError,
    models::chirp::{Chirp, SortOrder},
    repository::ChirpRepository,
};
use std::sync::Arc;
use uuid::Uuid;

/// 单条 chirp 的最大字符数
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

const CENSORED: &str = "****";

/// 以空格切词，整词（忽略大小写）命中时替换为 ****
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 校验长度并过滤
pub fn validate_chirp(body: &str) -> Result<String, AppError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(AppError::BadRequest("Chirp is too long".to_string()));
    }

    Ok(clean_body(body))
}

pub struct ChirpService {
    chirps: Arc<dyn ChirpRepository>,
}

impl ChirpService {
    pub fn new(chirps: Arc<dyn ChirpRepository>) -> Self {
        Self { chirps }
    }

    pub async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError> {
        let cleaned = validate_chirp(body)?;
        let chirp = self.chirps.create_chirp(user_id, &cleaned).await?;

        tracing::info!(chirp_id = %chirp.id, %user_id, "Chirp created");
        Ok(chirp)
    }

    pub async fn list(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<Chirp>, AppError> {
        let mut chirps = self.chirps.list_chirps(author_id).await?;

        if order == SortOrder::Desc {
            chirps.reverse();
        }

        Ok(chirps)
    }

    pub async fn get(&self, id: Uuid) -> Result<Chirp, AppError> {
        self.chirps
            .find_chirp(id)
            .await?
            .ok_or_else(|| AppError::not_found("chirp"))
    }

    /// 删除 chirp，只有作者本人可以删除
    pub async fn delete(&self, requester: Uuid, id: Uuid) -> Result<(), AppError> {
        let chirp = self.get(id).await?;

        if chirp.user_id != requester {
            tracing::warn!(chirp_id = %id, %requester, "Refusing to delete another user's chirp");
            return Err(AppError::Forbidden);
        }

        if !self.chirps.delete_chirp(id).await? {
            return Err(AppError::not_found("chirp"));
        }

        tracing::info!(chirp_id = %id, "Chirp deleted");
        Ok(())
    }
}
