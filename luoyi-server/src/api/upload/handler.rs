//! Image Upload Handler
//!
//! Accepts JPEG / PNG / WebP, re-encodes to JPEG and stores the file
//! under its content hash — uploading the same photo twice lands on the
//! same `{sha256}.jpg`, so records can share images freely.

use axum::Json;
use axum::extract::{Extension, Multipart, State};
use image::ImageFormat;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, ok};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// JPEG quality for wardrobe photos (85% - keeps fabric color while
/// controlling file size)
const JPEG_QUALITY: u8 = 85;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// 图片直链, 存入衣物/搭配记录的就是这个值
    pub url: String,
    /// 压缩后内容的 SHA256
    pub hash: String,
    /// 压缩后大小 (字节)
    pub size: usize,
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Validate and re-encode to JPEG
fn process_and_compress_image(data: &[u8]) -> Result<Vec<u8>, AppError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "图片过大，最大 {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let format = image::guess_format(data)
        .map_err(|e| AppError::validation(format!("无法识别的图片数据: {}", e)))?;
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP
    ) {
        return Err(AppError::validation(format!(
            "不支持的图片格式 {:?}，支持 jpeg / png / webp",
            format
        )));
    }

    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("图片解码失败: {}", e)))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("图片压缩失败: {}", e)))?;
    }

    Ok(buffer)
}

/// Upload image handler
pub async fn upload(
    State(state): State<ServerState>,
    Extension(_current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<AppResponse<UploadResponse>>, AppError> {
    let images_dir = state.config.images_dir();
    fs::create_dir_all(&images_dir)
        .map_err(|e| AppError::internal(format!("无法创建图片目录: {}", e)))?;

    // Find the file field
    let mut field_data: Option<Vec<u8>> = None;

    while let Some(f) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let name = f.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            field_data = Some(
                f.bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?
                    .to_vec(),
            );
            break;
        }
    }

    let data = field_data
        .ok_or_else(|| AppError::validation("缺少 'file' 字段".to_string()))?;
    if data.is_empty() {
        return Err(AppError::validation("空文件".to_string()));
    }

    let compressed = process_and_compress_image(&data)?;
    let hash = calculate_hash(&compressed);
    let filename = format!("{}.jpg", hash);
    let file_path = images_dir.join(&filename);

    // Content-addressed: duplicate upload hits the existing file
    if file_path.exists() {
        tracing::info!(hash = %hash, "duplicate image, reusing stored file");
    } else {
        fs::write(&file_path, &compressed)
            .map_err(|e| AppError::internal(format!("图片保存失败: {}", e)))?;
        tracing::info!(
            hash = %hash,
            size = compressed.len(),
            "image uploaded"
        );
    }

    Ok(ok(UploadResponse {
        url: format!("/api/image/{}", filename),
        hash,
        size: compressed.len(),
    }))
}
