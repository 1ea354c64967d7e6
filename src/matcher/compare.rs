//! 画像の完全一致判定
//!
//! サイズが一致し、RGB差分がすべて0の場合のみ一致とみなす（許容誤差なし）。
//! RGB以外のモードはRGBに正規化してから比較するため、アルファのみの差は検出できない。

use crate::scanner::CandidateImage;
use image::{DynamicImage, GenericImageView, RgbImage};

/// 2画像がピクセル単位で完全一致するか
pub fn images_are_equal(a: &DynamicImage, b: &DynamicImage) -> bool {
    if a.dimensions() != b.dimensions() {
        return false;
    }
    rgb_equal(&a.to_rgb8(), &b.to_rgb8())
}

/// RGB正規化済み画像の比較
pub fn rgb_equal(a: &RgbImage, b: &RgbImage) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// 候補を列挙順に比較し、最初に一致したものを返す
pub fn find_first_match<'a>(
    image: &RgbImage,
    candidates: &'a [CandidateImage],
) -> Option<&'a CandidateImage> {
    candidates.iter().find(|c| rgb_equal(image, &c.image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    fn solid(w: u32, h: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb(color))
    }

    fn candidate(name: &str, image: RgbImage) -> CandidateImage {
        CandidateImage { file_name: name.into(), image }
    }

    #[test]
    fn test_different_dimensions_are_unequal() {
        let a = DynamicImage::ImageRgb8(solid(4, 3, [0, 0, 0]));
        let b = DynamicImage::ImageRgb8(solid(3, 4, [0, 0, 0]));
        assert!(!images_are_equal(&a, &b));
    }

    #[test]
    fn test_identical_pixels_are_equal() {
        let a = DynamicImage::ImageRgb8(solid(5, 5, [200, 100, 50]));
        let b = DynamicImage::ImageRgb8(solid(5, 5, [200, 100, 50]));
        assert!(images_are_equal(&a, &b));
    }

    #[test]
    fn test_single_pixel_difference() {
        let a = solid(5, 5, [200, 100, 50]);
        let mut b = a.clone();
        b.put_pixel(4, 4, Rgb([200, 100, 51]));
        assert!(!rgb_equal(&a, &b));
    }

    #[test]
    fn test_alpha_only_difference_is_invisible() {
        let a = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])));
        let b = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 0])));
        assert!(images_are_equal(&a, &b));
    }

    #[test]
    fn test_first_match_wins() {
        let target = solid(2, 2, [1, 2, 3]);
        let candidates = vec![
            candidate("a.png", solid(2, 2, [9, 9, 9])),
            candidate("b.png", target.clone()),
            candidate("c.png", target.clone()),
        ];
        let found = find_first_match(&target, &candidates).unwrap();
        assert_eq!(found.file_name, "b.png");
    }

    #[test]
    fn test_single_true_match_independent_of_order() {
        let target = solid(3, 3, [7, 7, 7]);
        let matching = candidate("match.png", target.clone());
        let other = candidate("other.png", solid(3, 3, [8, 7, 7]));

        let forward = vec![matching.clone(), other.clone()];
        let reverse = vec![other, matching];

        assert_eq!(find_first_match(&target, &forward).unwrap().file_name, "match.png");
        assert_eq!(find_first_match(&target, &reverse).unwrap().file_name, "match.png");
    }

    #[test]
    fn test_no_match() {
        let target = solid(3, 3, [7, 7, 7]);
        let candidates = vec![candidate("x.png", solid(3, 3, [0, 0, 0]))];
        assert!(find_first_match(&target, &candidates).is_none());
    }
}
