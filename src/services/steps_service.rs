//! 解题步骤 - 业务能力层
//!
//! 只给出步骤，不给最终答案

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{LearnerContext, StepsResult};
use crate::services::fallback;
use crate::services::json_extractor;
use crate::services::llm_service::{CallOptions, LlmService};

const STEPS_OPTIONS: CallOptions = CallOptions::new(800, None);

const SYSTEM_PROMPT: &str = "Tu es un excellent professeur qui aide les élèves à comprendre comment résoudre un exercice. \
Tu expliques étape par étape la démarche à suivre, en t'adaptant à leur niveau. \
Tu ne dois jamais donner la réponse finale, seulement les étapes. \
Réponds STRICTEMENT en JSON, sans texte autour, sans bloc de code.";

/// 解题步骤服务
pub struct StepsService {
    llm_service: LlmService,
}

impl StepsService {
    pub fn new(llm_service: LlmService) -> Self {
        Self { llm_service }
    }

    /// 生成解题步骤，键为连续的 0..n
    ///
    /// - 回复无法解析：通用步骤
    /// - 解析出的不是对象：按行拆分原始回复
    pub async fn generate(&self, processed_text: &str, learner: &LearnerContext) -> StepsResult {
        if !self.llm_service.is_enabled() {
            return fallback::generic_steps();
        }

        let user_message = build_user_message(processed_text, learner);
        let response = match self
            .llm_service
            .send_to_llm(&user_message, SYSTEM_PROMPT, STEPS_OPTIONS)
            .await
        {
            Ok(completion) => completion.content,
            Err(e) => {
                warn!("⚠️ 步骤调用失败，使用通用步骤: {}", e);
                return fallback::generic_steps();
            }
        };

        let steps = match json_extractor::extract(&response) {
            Some(Value::Object(map)) => steps_from_object(&map),
            Some(_) => {
                debug!("步骤结果不是对象，按行拆分");
                fallback::steps_from_lines(&response)
            }
            None => {
                warn!("⚠️ 无法解析步骤结果，使用通用步骤");
                return fallback::generic_steps();
            }
        };

        if steps.is_empty() {
            warn!("⚠️ 步骤结果为空，使用通用步骤");
            return fallback::generic_steps();
        }
        steps
    }
}

/// 对象 → 有序步骤
///
/// 键全是数字时按数值排序，否则沿用对象的键顺序；最终重新编号为 0..n
fn steps_from_object(map: &Map<String, Value>) -> StepsResult {
    let mut entries: Vec<(Option<usize>, String)> = map
        .iter()
        .filter_map(|(key, value)| {
            let step = value.as_str()?.trim();
            (!step.is_empty()).then(|| (key.trim().parse::<usize>().ok(), step.to_string()))
        })
        .collect();

    if entries.iter().all(|(index, _)| index.is_some()) {
        entries.sort_by_key(|(index, _)| *index);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(position, (_, step))| (position, step))
        .collect()
}

fn build_user_message(processed_text: &str, learner: &LearnerContext) -> String {
    format!(
        r#"Exercice à analyser :
{}

Âge de l'élève : {} | Classe : {}.
Retourne UNIQUEMENT un JSON de la forme suivante :
{{
  "0": "Lire attentivement l'énoncé",
  "1": "Identifier les données et la question",
  "2": "Choisir la méthode et appliquer",
  "3": "Vérifier et rédiger la réponse"
}}
- Chaque clé DOIT être une chaîne ("0", "1", ...).
- Chaque valeur DOIT être une phrase claire et concise.
- Pas de commentaires, pas de texte hors JSON."#,
        processed_text,
        learner.age(),
        learner.grade()
    )
}
