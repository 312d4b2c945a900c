use serde::{Deserialize, Serialize};

use super::LearnerProfile;

/// 待处理的扫描文本（来自 TOML 文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPage {
    pub name: String,
    pub original_text: String,
    pub learner: LearnerProfile,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl ScanPage {
    /// 输出文件名（去掉路径分隔符，避免写到输出目录之外）
    pub fn output_file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        format!("{}.json", stem.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_page() {
        let content = r#"
name = "chapitre-3"
original_text = """
Ceci est un résumé du chapitre 3.
"""

[learner]
name = "Awa"
age = 10
grade = "CM2"
"#;
        let page: ScanPage = toml::from_str(content).unwrap();
        assert_eq!(page.name, "chapitre-3");
        assert_eq!(page.learner.age, 10);
        assert!(page.original_text.contains("résumé"));
        assert!(page.file_path.is_none());
    }

    #[test]
    fn test_output_file_name_strips_separators() {
        let page = ScanPage {
            name: "cours/histoire".to_string(),
            original_text: String::new(),
            learner: LearnerProfile {
                name: None,
                age: 11,
                grade: "6ème".to_string(),
            },
            file_path: None,
        };
        assert_eq!(page.output_file_name(), "cours_histoire.json");
    }
}
