use std::path::{Path, PathBuf};

use image::ImageFormat;
use log::debug;
use uuid::Uuid;

use crate::error::DiagnosisError;

use super::geometry::MappedCropRegion;

/// Crop `photo_path` to `region` and write the result as a new JPEG in the
/// OS temp directory. The source file is left untouched; cleaning it up is
/// the caller's responsibility.
pub fn crop_to_region(
    photo_path: &Path,
    region: &MappedCropRegion,
) -> Result<PathBuf, DiagnosisError> {
    let img = image::open(photo_path)
        .map_err(|err| DiagnosisError::CropFailed(format!("cannot open photo: {err}")))?;

    let rect = region.to_pixel_rect(img.width(), img.height());
    if rect.width == 0 || rect.height == 0 {
        return Err(DiagnosisError::CropFailed(format!(
            "crop region {rect:?} is empty for a {}x{} photo",
            img.width(),
            img.height()
        )));
    }

    let cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);

    let out_path = std::env::temp_dir().join(format!("plantcare_crop_{}.jpg", Uuid::new_v4()));
    cropped
        .to_rgb8()
        .save_with_format(&out_path, ImageFormat::Jpeg)
        .map_err(|err| DiagnosisError::CropFailed(format!("cannot write cropped file: {err}")))?;

    debug!(
        "Cropped {} to {}x{} at ({}, {}) -> {}",
        photo_path.display(),
        rect.width,
        rect.height,
        rect.x,
        rect.y,
        out_path.display()
    );

    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::geometry::{map_frame_to_photo, DetectionFrame};
    use image::{Rgb, RgbImage};

    fn write_test_photo(dir: &Path, width: u32, height: u32) -> PathBuf {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, 0]);
        }
        let path = dir.join("photo.jpg");
        img.save_with_format(&path, ImageFormat::Jpeg).unwrap();
        path
    }

    #[test]
    fn crops_to_the_mapped_region_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_test_photo(dir.path(), 400, 300);

        let frame = DetectionFrame {
            x: 25.0,
            y: 30.0,
            width: 50.0,
            height: 60.0,
        };
        let region = map_frame_to_photo(400.0, 300.0, 200.0, 150.0, &frame);
        let cropped_path = crop_to_region(&photo, &region).unwrap();

        let cropped = image::open(&cropped_path).unwrap();
        assert_eq!(cropped.width(), 100);
        assert_eq!(cropped.height(), 120);

        // Source must survive the crop.
        assert!(photo.exists());
        std::fs::remove_file(cropped_path).unwrap();
    }

    #[test]
    fn missing_photo_is_a_crop_failure() {
        let frame = DetectionFrame {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let region = map_frame_to_photo(100.0, 100.0, 100.0, 100.0, &frame);
        let err = crop_to_region(Path::new("/nonexistent/photo.jpg"), &region).unwrap_err();

        assert!(matches!(err, DiagnosisError::CropFailed(_)));
    }

    #[test]
    fn empty_region_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_test_photo(dir.path(), 50, 50);

        let region = map_frame_to_photo(
            50.0,
            50.0,
            100.0,
            100.0,
            &DetectionFrame {
                x: 99.9,
                y: 99.9,
                width: 0.05,
                height: 0.05,
            },
        );
        let err = crop_to_region(&photo, &region).unwrap_err();

        assert!(matches!(err, DiagnosisError::CropFailed(_)));
    }
}
