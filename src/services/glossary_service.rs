//! 难词释义 - 业务能力层

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{GlossaryResult, LearnerContext};
use crate::services::fallback;
use crate::services::json_extractor;
use crate::services::llm_service::{CallOptions, LlmService};

const GLOSSARY_OPTIONS: CallOptions = CallOptions::new(800, Some(0.2));

/// 提示词要求 1~8 个词
const MAX_PROVIDER_ENTRIES: usize = 8;

/// 难词释义服务
///
/// 职责：
/// - 找出对该学生可能偏难的词，给出简化释义
/// - 键为词在文本中的位置（按空白切分，从 0 开始）
/// - LLM 结果为空或无效时使用启发式兜底
pub struct GlossaryService {
    llm_service: LlmService,
}

impl GlossaryService {
    pub fn new(llm_service: LlmService) -> Self {
        Self { llm_service }
    }

    pub async fn generate(&self, processed_text: &str, learner: &LearnerContext) -> GlossaryResult {
        if !self.llm_service.is_enabled() {
            return fallback::glossary(processed_text, learner);
        }

        let (user_message, system_message) = build_messages(processed_text, learner);
        let response = match self
            .llm_service
            .send_to_llm(&user_message, &system_message, GLOSSARY_OPTIONS)
            .await
        {
            Ok(completion) => completion.content,
            Err(e) => {
                warn!("⚠️ 难词调用失败，使用兜底: {}", e);
                return fallback::glossary(processed_text, learner);
            }
        };

        let glossary = parse_glossary(&response);
        if glossary.is_empty() {
            warn!("⚠️ 难词结果为空或无效，使用兜底");
            return fallback::glossary(processed_text, learner);
        }

        debug!("LLM 返回 {} 个难词", glossary.len());
        glossary
    }
}

/// 只保留"纯数字键 → 非空字符串"的条目，最多 8 个（按位置从小到大）
fn parse_glossary(response: &str) -> GlossaryResult {
    let Some(Value::Object(map)) = json_extractor::extract(response) else {
        return GlossaryResult::new();
    };

    let entries: GlossaryResult = map
        .iter()
        .filter_map(|(key, value)| {
            let index = parse_word_index(key)?;
            let definition = value.as_str()?.trim();
            (!definition.is_empty()).then(|| (index, definition.to_string()))
        })
        .collect();

    entries.into_iter().take(MAX_PROVIDER_ENTRIES).collect()
}

/// `usize::from_str` 接受前导 `+`，这里只认纯数字
fn parse_word_index(key: &str) -> Option<usize> {
    let key = key.trim();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn build_messages(processed_text: &str, learner: &LearnerContext) -> (String, String) {
    let system_message = format!(
        "Tu es un assistant pédagogique spécialisé dans la simplification de texte. \
Tu dois identifier les mots qui pourraient être compliqués pour un élève selon son âge et son niveau scolaire.\n\n\
Consignes strictes de sortie :\n\
- Réponds UNIQUEMENT en JSON valide, sans bloc de code, sans texte autour.\n\
- Retourne entre 1 et 8 éléments.\n\
- Les clés DOIVENT être des chaînes représentant l'index du mot (\"0\", \"7\", ...).\n\
- Les valeurs DOIVENT être des définitions simples adaptées à {} ans (classe {}).",
        learner.age(),
        learner.grade()
    );

    let user_message = format!(
        r#"Voici le texte à analyser :

{}

Retourne UNIQUEMENT un JSON de ce type :
{{
  "3": "Définition simple",
  "7": "Explication facile"
}}
Chaque clé correspond à la position du mot dans le texte (split par espace) en partant de 0."#,
        processed_text
    );

    (user_message, system_message)
}
