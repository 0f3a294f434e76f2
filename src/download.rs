//! streaming file downloader (C3)
use crate::error::{AppError, Result};
use crate::sanitize;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

const CHUNK_LOG_GRANULARITY: u64 = 8 * 1024;

/// progress emitted synchronously as each chunk is written to disk
pub struct ProgressEvent<'a> {
    pub name: &'a str,
    pub total_bytes: Option<u64>,
    pub bytes_just_written: u64,
    pub cumulative_bytes: u64,
}

/// stream `url` to `destination_dir/<sanitized(filename)>`, single attempt
/// (retries are the caller's responsibility, §4.3). On any failure or
/// cancellation the partially-written file is deleted before the error
/// propagates.
pub async fn download(
    client: &Client,
    url: &str,
    destination_dir: &Path,
    filename: &str,
    guess_extension: bool,
    cancel: &CancellationToken,
    mut on_progress: impl FnMut(ProgressEvent<'_>),
) -> Result<PathBuf> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status.as_u16() != 200 {
        return Err(AppError::DownloadError(format!(
            "unexpected status {status} downloading {url}"
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let total_bytes = response.content_length();

    let mut final_name = sanitize::sanitize(filename, 200);
    if final_name.is_empty() {
        final_name = "download".to_string();
    }
    if guess_extension {
        if let Some(ext) = content_type.as_deref().and_then(guess_extension_from_content_type) {
            final_name = replace_extension(&final_name, ext);
        }
    }

    let dest_path = destination_dir.join(&final_name);
    tokio::fs::create_dir_all(destination_dir).await?;

    let mut file = File::create(&dest_path).await?;
    let mut cumulative: u64 = 0;
    let mut stream = response.bytes_stream();

    let result: Result<()> = async {
        while let Some(chunk) = stream.next().await {
            if cancel.is_cancelled() {
                return Err(AppError::DownloadCancelledError);
            }

            let chunk = chunk?;
            file.write_all(&chunk).await?;
            cumulative += chunk.len() as u64;

            on_progress(ProgressEvent {
                name: &final_name,
                total_bytes,
                bytes_just_written: chunk.len() as u64,
                cumulative_bytes: cumulative,
            });
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            file.flush().await?;
            Ok(dest_path)
        }
        Err(e) => {
            drop(file);
            let _ = tokio::fs::remove_file(&dest_path).await;
            Err(e)
        }
    }
}

fn replace_extension(filename: &str, new_ext: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _old_ext)) if !stem.is_empty() => format!("{stem}.{new_ext}"),
        _ => format!("{filename}.{new_ext}"),
    }
}

/// a narrow content-type -> extension table, grounded in the kind of
/// mapping boosty/e621-adjacent downloaders keep for their media
fn guess_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let base = content_type.split(';').next().unwrap_or(content_type).trim();
    Some(match base {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "audio/wav" | "audio/x-wav" => "wav",
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "application/x-rar-compressed" | "application/vnd.rar" => "rar",
        "text/plain" => "txt",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_common_image_type() {
        assert_eq!(guess_extension_from_content_type("image/png"), Some("png"));
    }

    #[test]
    fn ignores_charset_suffix() {
        assert_eq!(
            guess_extension_from_content_type("text/plain; charset=utf-8"),
            Some("txt")
        );
    }

    #[test]
    fn unknown_type_guesses_nothing() {
        assert_eq!(guess_extension_from_content_type("application/x-bogus"), None);
    }

    #[test]
    fn replaces_extension_preserving_stem() {
        assert_eq!(replace_extension("photo.bin", "png"), "photo.png");
    }

    #[test]
    fn appends_extension_when_none_present() {
        assert_eq!(replace_extension("photo", "png"), "photo.png");
    }
}
