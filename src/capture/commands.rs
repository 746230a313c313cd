use std::path::PathBuf;

use log::{error, info};
use tauri::State;

use crate::error::DiagnosisError;
use crate::AppState;

use super::{crop_to_region, geometry::map_frame_to_photo, CaptureFrame, DetectionFrame};

/// Shutter path: the camera layer hands over the full-quality photo plus the
/// preview viewport size; we map the on-screen guide frame onto the photo,
/// crop, and return the cropped file for the result screen to classify on
/// demand. Any failure here is surfaced to the user as a capture error.
#[tauri::command]
pub async fn crop_captured_photo(
    photo_path: PathBuf,
    photo_width: u32,
    photo_height: u32,
    preview_width: f64,
    preview_height: f64,
) -> Result<PathBuf, String> {
    let frame = DetectionFrame::centered(preview_width, preview_height);
    let region = map_frame_to_photo(
        f64::from(photo_width),
        f64::from(photo_height),
        preview_width,
        preview_height,
        &frame,
    );

    match crop_to_region(&photo_path, &region) {
        Ok(cropped) => {
            info!(
                "Cropped shutter capture {} -> {}",
                photo_path.display(),
                cropped.display()
            );
            Ok(cropped)
        }
        Err(err) => {
            error!("Capture crop failed: {err}");
            Err(err.user_message())
        }
    }
}

/// Gallery path: the picked image is used as-is, no mapping or cropping. We
/// only verify the file is readable before handing it downstream.
#[tauri::command]
pub async fn import_library_photo(photo_path: PathBuf) -> Result<PathBuf, String> {
    if !photo_path.is_file() {
        return Err(DiagnosisError::InvalidImage(photo_path).user_message());
    }
    Ok(photo_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn library_import_uses_the_shared_invalid_image_message() {
        let path = PathBuf::from("/nonexistent/leaf.jpg");
        let err = import_library_photo(path.clone()).await.unwrap_err();
        assert_eq!(err, DiagnosisError::InvalidImage(path).user_message());
    }

    #[tokio::test]
    async fn library_import_passes_readable_files_through_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        assert_eq!(import_library_photo(path.clone()).await.unwrap(), path);
    }
}

/// Receives the webview's most recent preview capture for the live-scan loop.
#[tauri::command]
pub async fn submit_preview_frame(
    state: State<'_, AppState>,
    frame: CaptureFrame,
) -> Result<(), String> {
    state.preview_feed.submit(frame);
    Ok(())
}
