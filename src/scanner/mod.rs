use crate::error::{MigrationError, Result};
use image::{ImageReader, RgbImage};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// 照合候補画像（デコード済み・RGB正規化済み）
#[derive(Debug, Clone)]
pub struct CandidateImage {
    pub file_name: String,
    pub image: RgbImage,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// フォルダ直下の画像ファイルをファイル名順で列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(MigrationError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_image_extension(&ext.to_string_lossy()) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                images.push(ImageInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 候補画像を一度だけ読み込む
///
/// デコードできないファイルは警告を出して除外する。
pub fn load_candidates(folder: &Path) -> Result<Vec<CandidateImage>> {
    let infos = scan_folder(folder)?;
    let mut candidates = Vec::with_capacity(infos.len());

    for info in infos {
        match decode_candidate(&info.path) {
            Ok(img) => candidates.push(CandidateImage {
                file_name: info.file_name,
                image: img.to_rgb8(),
            }),
            Err(e) => warn!(file = %info.file_name, error = %e, "候補画像を読み込めません"),
        }
    }

    Ok(candidates)
}

/// 中身から形式を判定してデコード（書き出し画像は拡張子と形式が一致しないことがある）
fn decode_candidate(path: &Path) -> image::ImageResult<image::DynamicImage> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

/// 拡張子の判定（大文字小文字を区別しない）
fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("JPG"));
        assert!(is_image_extension("jpeg"));
        assert!(is_image_extension("Png"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("gif"));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(MigrationError::FolderNotFound(_))));
    }

    #[test]
    fn test_images_sorted_by_filename() {
        let dir = tempdir().unwrap();

        File::create(dir.path().join("temp_image_3.png")).unwrap();
        File::create(dir.path().join("temp_image_1.PNG")).unwrap();
        File::create(dir.path().join("temp_image_2.jpeg")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let result = scan_folder(dir.path()).unwrap();
        let names: Vec<_> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["temp_image_1.PNG", "temp_image_2.jpeg", "temp_image_3.png"]);
    }

    #[test]
    fn test_load_candidates_skips_undecodable() {
        let dir = tempdir().unwrap();

        let img = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        img.save(dir.path().join("good.png")).unwrap();
        fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let candidates = load_candidates(dir.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].file_name, "good.png");
        assert_eq!(candidates[0].image.dimensions(), (2, 2));
    }

    #[test]
    fn test_load_candidates_png_named_jpg() {
        let dir = tempdir().unwrap();

        let img = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        img.save(dir.path().join("source.png")).unwrap();
        fs::rename(dir.path().join("source.png"), dir.path().join("Sky Bar - Silom Rd.jpg")).unwrap();

        let candidates = load_candidates(dir.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].image, img);
    }
}
