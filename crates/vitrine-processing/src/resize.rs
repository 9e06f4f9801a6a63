use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Width-driven resize operations
pub struct ImageResize;

impl ImageResize {
    /// Dimensions for a target width, keeping the source aspect ratio.
    ///
    /// `height = round(orig_height * width / orig_width)`, never below 1.
    pub fn target_dimensions(orig_width: u32, orig_height: u32, width: u32) -> (u32, u32) {
        if orig_width == 0 {
            return (width.max(1), orig_height.max(1));
        }
        let height = (orig_height as f64 * width as f64 / orig_width as f64).round() as u32;
        (width.max(1), height.max(1))
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Resize to `width`, upscaling when the source is narrower.
    pub fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let (target_width, target_height) =
            Self::target_dimensions(orig_width, orig_height, width);

        if (target_width, target_height) == (orig_width, orig_height) {
            return img.clone();
        }

        let filter = Self::select_filter(orig_width, orig_height, target_width, target_height);
        img.resize_exact(target_width, target_height, filter)
    }
}
