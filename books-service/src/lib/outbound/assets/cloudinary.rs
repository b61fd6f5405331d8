use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde::Deserialize;
use sha2::Digest;
use sha2::Sha256;

use crate::book::errors::AssetStoreError;
use crate::domain::book::models::AssetKind;
use crate::domain::book::models::StoredAsset;
use crate::domain::book::ports::AssetStore;

/// Cloudinary account settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Asset store backed by the Cloudinary upload API, using signed requests.
pub struct CloudinaryAssetStore {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
    secure_url: Option<String>,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryAssetStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, kind: AssetKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name,
            kind.resource_type(),
            action
        )
    }
}

/// Request signature: SHA-256 over the sorted `key=value` pairs joined with
/// `&`, followed by the API secret, hex encoded.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let payload = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn upload(&self, bytes: Vec<u8>, kind: AssetKind) -> Result<StoredAsset, AssetStoreError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(&[("timestamp", timestamp.as_str())], &self.config.api_secret);
        let size = bytes.len();

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name("upload"))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint(kind, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssetStoreError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetStoreError::UploadFailed(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AssetStoreError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            public_id = %uploaded.public_id,
            resource_type = kind.resource_type(),
            bytes = size,
            "Asset uploaded"
        );

        Ok(StoredAsset {
            url: uploaded.secure_url.unwrap_or(uploaded.url),
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str, kind: AssetKind) -> Result<(), AssetStoreError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let response = self
            .http
            .post(self.endpoint(kind, "destroy"))
            .form(&[
                ("public_id", public_id),
                ("api_key", self.config.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature_algorithm", "sha256"),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AssetStoreError::DeleteFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetStoreError::DeleteFailed(format!(
                "status {}",
                status.as_u16()
            )));
        }

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| AssetStoreError::InvalidResponse(e.to_string()))?;

        match destroyed.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(AssetStoreError::DeleteFailed(other.to_string())),
        }
    }
}
