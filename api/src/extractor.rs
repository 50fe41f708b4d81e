use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use base64::{engine::general_purpose, Engine as _};
use registry::AppRegistry;
use shared::error::AppError;

/// エクスポート API の Basic 認証
/// 設定された資格情報と一致しないリクエストは 401 で弾く
pub struct ExportCredential;

#[async_trait]
impl FromRequestParts<AppRegistry> for ExportCredential {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::UnauthenticatedError)?;
        let encoded = header_value
            .strip_prefix("Basic ")
            .ok_or(AppError::UnauthenticatedError)?;
        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| AppError::UnauthenticatedError)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AppError::UnauthenticatedError)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AppError::UnauthenticatedError)?;

        let config = registry.app_config();
        if username != config.export.username || password != config.export.password {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(Self)
    }
}
