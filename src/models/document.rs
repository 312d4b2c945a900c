//! 扫描文档模型
//!
//! 一个文档只能经历一次 `created → classified` 的状态转换，
//! processed_text 和 detected_type 要么同时为空，要么同时存在。

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// 文本类型（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// 练习题
    Exercise,
    /// 课程 / 普通文本
    Text,
    /// 无法判断
    #[default]
    Unknown,
}

impl DocumentType {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            DocumentType::Exercise => "exercise",
            DocumentType::Text => "text",
            DocumentType::Unknown => "unknown",
        }
    }

    /// 从 LLM 返回的标签解析
    ///
    /// 只接受"练习题"和"课程"两类标签，其余返回 None，交给关键词兜底
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "exercice" | "exercise" => Some(DocumentType::Exercise),
            "cours" | "course" | "texte" | "text" => Some(DocumentType::Text),
            _ => None,
        }
    }
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 分类结果：清洗后的文本 + 类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub processed_text: String,
    pub detected_type: DocumentType,
}

/// 扫描文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    original_text: String,
    classification: Option<Classification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// 创建未分类的新文档
    pub fn new(owner_id: Uuid, original_text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            original_text: original_text.into(),
            classification: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// 清洗后的文本，未分类或为空时返回 None
    pub fn processed_text(&self) -> Option<&str> {
        self.classification
            .as_ref()
            .map(|c| c.processed_text.as_str())
            .filter(|text| !text.trim().is_empty())
    }

    /// 未分类的文档视为 Unknown
    pub fn detected_type(&self) -> DocumentType {
        self.classification
            .as_ref()
            .map(|c| c.detected_type)
            .unwrap_or_default()
    }

    pub fn is_classified(&self) -> bool {
        self.classification.is_some()
    }

    /// 写入分类结果（一次性转换）
    pub fn apply_classification(
        &mut self,
        classification: Classification,
    ) -> Result<(), ValidationError> {
        if self.classification.is_some() {
            return Err(ValidationError::AlreadyClassified);
        }
        self.classification = Some(classification);
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 #{} ({})]", self.id, self.detected_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(text: &str, detected_type: DocumentType) -> Classification {
        Classification {
            processed_text: text.to_string(),
            detected_type,
        }
    }

    #[test]
    fn test_new_document_is_unclassified() {
        let doc = Document::new(Uuid::new_v4(), "Exercice 1");
        assert!(!doc.is_classified());
        assert_eq!(doc.processed_text(), None);
        assert_eq!(doc.detected_type(), DocumentType::Unknown);
    }

    #[test]
    fn test_apply_classification_once() {
        let mut doc = Document::new(Uuid::new_v4(), "Exercice 1");
        doc.apply_classification(classification("Exercice 1", DocumentType::Exercise))
            .unwrap();

        assert_eq!(doc.processed_text(), Some("Exercice 1"));
        assert_eq!(doc.detected_type(), DocumentType::Exercise);

        let again = doc.apply_classification(classification("autre", DocumentType::Text));
        assert_eq!(again, Err(ValidationError::AlreadyClassified));
        assert_eq!(doc.detected_type(), DocumentType::Exercise);
    }

    #[test]
    fn test_blank_processed_text_is_treated_as_missing() {
        let mut doc = Document::new(Uuid::new_v4(), "x");
        doc.apply_classification(classification("   ", DocumentType::Text))
            .unwrap();
        assert_eq!(doc.processed_text(), None);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(DocumentType::from_label("exercice"), Some(DocumentType::Exercise));
        assert_eq!(DocumentType::from_label(" Cours "), Some(DocumentType::Text));
        assert_eq!(DocumentType::from_label("poème"), None);
        assert_eq!(DocumentType::from_label(""), None);
    }

    #[test]
    fn test_serialize_type_label() {
        let json = serde_json::to_string(&DocumentType::Exercise).unwrap();
        assert_eq!(json, "\"exercise\"");
    }
}
