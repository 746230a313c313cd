//! Mapping between on-screen preview coordinates and photo pixel space.
//!
//! The camera preview shows a fixed guide rectangle (the detection frame).
//! Captured photos come back at the sensor's resolution, which differs from
//! the preview viewport, so the frame has to be rescaled before cropping.

use serde::{Deserialize, Serialize};

/// Share of the preview viewport covered by the on-screen guide frame.
pub const FRAME_WIDTH_RATIO: f64 = 0.7;
pub const FRAME_HEIGHT_RATIO: f64 = 0.4;

/// The guide rectangle in preview (logical pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DetectionFrame {
    /// The frame shown on the camera screen: 70% of the preview width, 40%
    /// of its height, centered.
    pub fn centered(preview_width: f64, preview_height: f64) -> Self {
        let width = preview_width * FRAME_WIDTH_RATIO;
        let height = preview_height * FRAME_HEIGHT_RATIO;
        Self {
            x: (preview_width - width) / 2.0,
            y: (preview_height - height) / 2.0,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// The detection frame rescaled into photo pixel space. Derived, never
/// mutated; recomputed per capture since photo resolution varies by device
/// and capture mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappedCropRegion {
    pub offset: Offset,
    pub size: Size,
}

/// Integer crop bounds for the image decoder, already clamped to the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Rescale `frame` from preview coordinates into photo pixel coordinates
/// using independent horizontal and vertical scale factors.
pub fn map_frame_to_photo(
    photo_width: f64,
    photo_height: f64,
    preview_width: f64,
    preview_height: f64,
    frame: &DetectionFrame,
) -> MappedCropRegion {
    let scale_x = photo_width / preview_width;
    let scale_y = photo_height / preview_height;

    MappedCropRegion {
        offset: Offset {
            x: frame.x * scale_x,
            y: frame.y * scale_y,
        },
        size: Size {
            width: frame.width * scale_x,
            height: frame.height * scale_y,
        },
    }
}

impl MappedCropRegion {
    /// Convert to integer pixel bounds, rounding to nearest and clamping to
    /// `[0, photo_width] x [0, photo_height]` so a preview/photo mismatch can
    /// never request pixels outside the image.
    pub fn to_pixel_rect(&self, photo_width: u32, photo_height: u32) -> PixelRect {
        let x = round_clamped(self.offset.x, photo_width);
        let y = round_clamped(self.offset.y, photo_height);
        let width = round_clamped(self.size.width, photo_width - x);
        let height = round_clamped(self.size.height, photo_height - y);
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

fn round_clamped(value: f64, max: u32) -> u32 {
    let rounded = value.round().max(0.0) as u64;
    rounded.min(u64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn mapping_is_linear_in_both_axes() {
        let frame = DetectionFrame {
            x: 100.0,
            y: 50.0,
            width: 300.0,
            height: 200.0,
        };
        let region = map_frame_to_photo(4000.0, 3000.0, 1000.0, 500.0, &frame);

        let scale_x = 4000.0 / 1000.0;
        let scale_y = 3000.0 / 500.0;
        assert!((region.offset.x - frame.x * scale_x).abs() < EPSILON);
        assert!((region.offset.y - frame.y * scale_y).abs() < EPSILON);
        assert!((region.size.width - frame.width * scale_x).abs() < EPSILON);
        assert!((region.size.height - frame.height * scale_y).abs() < EPSILON);
    }

    #[test]
    fn identity_scale_returns_the_frame_unchanged() {
        let frame = DetectionFrame {
            x: 162.0,
            y: 468.0,
            width: 756.0,
            height: 936.0,
        };
        let region = map_frame_to_photo(1080.0, 2340.0, 1080.0, 2340.0, &frame);

        assert!((region.offset.x - frame.x).abs() < EPSILON);
        assert!((region.offset.y - frame.y).abs() < EPSILON);
        assert!((region.size.width - frame.width).abs() < EPSILON);
        assert!((region.size.height - frame.height).abs() < EPSILON);
    }

    #[test]
    fn shutter_capture_reference_mapping() {
        // 3000x4000 photo behind a 1080x2340 preview with the standard
        // centered guide frame.
        let frame = DetectionFrame::centered(1080.0, 2340.0);
        assert!((frame.x - 162.0).abs() < EPSILON);
        assert!((frame.y - 468.0).abs() < EPSILON);
        assert!((frame.width - 756.0).abs() < EPSILON);
        assert!((frame.height - 936.0).abs() < EPSILON);

        let region = map_frame_to_photo(3000.0, 4000.0, 1080.0, 2340.0, &frame);
        let rect = region.to_pixel_rect(3000, 4000);

        assert_eq!(
            rect,
            PixelRect {
                x: 450,
                y: 800,
                width: 2100,
                height: 1600
            }
        );
    }

    #[test]
    fn frame_serializes_with_plain_field_names() {
        let frame = DetectionFrame {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        };
        let value = serde_json::to_value(frame).unwrap();
        assert_eq!(value["x"], 1.0);
        assert_eq!(value["width"], 3.0);
    }

    #[test]
    fn pixel_rect_clamps_to_photo_bounds() {
        // Photo smaller than the mapped region: the rect must stay inside.
        let region = MappedCropRegion {
            offset: Offset { x: 80.0, y: 90.0 },
            size: Size {
                width: 500.0,
                height: 500.0,
            },
        };
        let rect = region.to_pixel_rect(100, 100);

        assert_eq!(rect.x, 80);
        assert_eq!(rect.y, 90);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 10);
    }

    #[test]
    fn pixel_rect_never_goes_negative() {
        let region = MappedCropRegion {
            offset: Offset { x: -5.0, y: -5.0 },
            size: Size {
                width: 50.0,
                height: 50.0,
            },
        };
        let rect = region.to_pixel_rect(100, 100);

        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 50);
    }

    #[test]
    fn rounding_is_to_nearest_not_truncation() {
        let region = MappedCropRegion {
            offset: Offset { x: 10.6, y: 10.4 },
            size: Size {
                width: 20.5,
                height: 20.49,
            },
        };
        let rect = region.to_pixel_rect(1000, 1000);

        assert_eq!(rect.x, 11);
        assert_eq!(rect.y, 10);
        assert_eq!(rect.width, 21);
        assert_eq!(rect.height, 20);
    }
}
