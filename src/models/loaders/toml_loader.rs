use crate::error::{AppResult, FileError};
use crate::models::ScanPage;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载数据并转换为 ScanPage 对象
pub async fn load_toml_to_scan_page(toml_file_path: &Path) -> AppResult<ScanPage> {
    let path_display = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path_display.clone(),
            source,
        })?;

    let mut page: ScanPage =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path_display,
            source,
        })?;

    // 设置文件路径
    page.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(page)
}

/// 从文件夹中加载所有 TOML 文件并转换为 ScanPage 对象列表
///
/// 单个文件解析失败只记录警告，不影响其他文件
pub async fn load_all_toml_files(folder_path: &str) -> AppResult<Vec<ScanPage>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let read_failed = |source| FileError::ReadFailed {
        path: folder_path.to_string(),
        source,
    };

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder).await.map_err(read_failed)?;
    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    // read_dir 顺序不稳定
    paths.sort();

    let mut scan_pages = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_toml_to_scan_page(&path).await {
            Ok(page) => {
                tracing::info!(
                    "成功加载扫描文本 {} ({} 字符)",
                    page.name,
                    page.original_text.chars().count()
                );
                scan_pages.push(page);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(scan_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    const VALID_SCAN: &str = r#"
name = "exo-fractions"
original_text = "Exercice 2 : calcule 3/4 + 1/2."

[learner]
age = 11
grade = "6ème"
"#;

    #[tokio::test]
    async fn test_load_all_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_SCAN).unwrap();
        std::fs::write(dir.path().join("b.toml"), "name = ").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pages = load_all_toml_files(dir.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].name, "exo-fractions");
        assert!(pages[0].file_path.as_deref().unwrap().ends_with("a.toml"));
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let result = load_all_toml_files("/definitely/not/a/scan/folder").await;
        assert!(matches!(
            result,
            Err(AppError::File(FileError::DirectoryNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_parse_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "original_text = 3").unwrap();

        let result = load_toml_to_scan_page(&path).await;
        assert!(matches!(
            result,
            Err(AppError::File(FileError::TomlParseFailed { .. }))
        ));
    }
}
