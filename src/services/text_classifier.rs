//! 文本分类与清洗 - 业务能力层
//!
//! 对原始 OCR 文本只做一次：产出 processed_text 和类型。
//! 永不失败，任何 LLM 问题都落到关键词兜底。

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{Classification, DocumentType};
use crate::services::fallback;
use crate::services::json_extractor;
use crate::services::llm_service::{CallOptions, LlmService};

const CLASSIFY_OPTIONS: CallOptions = CallOptions::new(1000, None);

const SYSTEM_PROMPT: &str = "Tu es un agent intelligent qui analyse un texte scanné par OCR. \
Tu dois déterminer s'il s'agit d'un **exercice** ou d'un **cours** (le champ `detected_type`), \
et reformater proprement le contenu dans `processed_text` (sans fautes, sans bruit OCR, sans retours à la ligne inutiles). \
Réponds STRICTEMENT en JSON, sans texte autour, sans bloc de code.";

/// 文本分类服务
pub struct TextClassifier {
    llm_service: LlmService,
    max_chars: usize,
}

impl TextClassifier {
    /// 创建新的分类服务
    ///
    /// `max_chars`: LLM 未给出清洗文本时的截断长度
    pub fn new(llm_service: LlmService, max_chars: usize) -> Self {
        Self {
            llm_service,
            max_chars,
        }
    }

    /// 清洗并分类
    ///
    /// 调用方需保证 `raw_text` 去掉空白后非空
    pub async fn classify(&self, raw_text: &str) -> Classification {
        if !self.llm_service.is_enabled() {
            info!("LLM 未启用，使用离线清洗与关键词分类");
            return self.fallback(raw_text);
        }

        let user_message = build_user_message(raw_text);
        match self
            .llm_service
            .send_to_llm(&user_message, SYSTEM_PROMPT, CLASSIFY_OPTIONS)
            .await
        {
            Ok(completion) => self.from_response(raw_text, &completion.content),
            Err(e) => {
                warn!("⚠️ 分类调用失败，使用兜底: {}", e);
                self.fallback(raw_text)
            }
        }
    }

    fn fallback(&self, raw_text: &str) -> Classification {
        let processed_text = fallback::pseudo_clean_text(raw_text, self.max_chars);
        let detected_type = fallback::detect_type(&processed_text);
        Classification {
            processed_text,
            detected_type,
        }
    }

    /// 解析 LLM 回复
    fn from_response(&self, raw_text: &str, response: &str) -> Classification {
        let parsed = match json_extractor::extract(response) {
            Some(Value::Object(map)) => map,
            _ => {
                warn!("⚠️ 无法解析分类结果，使用兜底");
                return Classification {
                    processed_text: fallback::pseudo_clean_text(raw_text, self.max_chars),
                    detected_type: fallback::detect_type(raw_text),
                };
            }
        };

        let processed_text = parsed
            .get("processed_text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                debug!("LLM 未返回 processed_text，截断原文");
                fallback::pseudo_clean_text(raw_text, self.max_chars)
            });

        let detected_type = parsed
            .get("detected_type")
            .and_then(Value::as_str)
            .and_then(DocumentType::from_label)
            .unwrap_or_else(|| {
                debug!("LLM 返回的类型不可用，使用关键词判断");
                fallback::detect_type(&processed_text)
            });

        Classification {
            processed_text,
            detected_type,
        }
    }
}

fn build_user_message(raw_text: &str) -> String {
    format!(
        r#"Voici un texte brut scanné :

{}

Analyse le texte ci-dessus et retourne UNIQUEMENT un JSON strictement de la forme :
{{
  "processed_text": "Texte nettoyé et lisible...",
  "detected_type": "cours"
}}
- La valeur de 'detected_type' doit être 'cours' ou 'exercice'.
- Pas de commentaires ou de texte hors JSON.
Fais attention à garder la structure utile du contenu. Ne change pas la nature du texte."#,
        raw_text
    )
}
