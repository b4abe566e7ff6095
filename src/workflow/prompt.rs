//! 通知文生成・翻訳用のプロンプト構築

use crate::catalog::{Language, Persona, PurposeRegistry};
use crate::llm::{LlmRequest, Message};

/// 通知文生成のサンプリング温度
pub const NOTICE_TEMPERATURE: f32 = 0.7;
/// 通知文生成の最大トークン数
pub const NOTICE_MAX_TOKENS: usize = 1000;
/// 翻訳のサンプリング温度
pub const TRANSLATION_TEMPERATURE: f32 = 0.3;
/// 翻訳の最大トークン数
pub const TRANSLATION_MAX_TOKENS: usize = 1500;

const TRANSLATION_SYSTEM_PROMPT: &str = "You are AI4Bharat's IndicTrans2 translation engine, \
specialized in accurate translations between English and Indian languages. You always maintain \
legal accuracy while using simple, understandable language.";

/// 通知文生成リクエストを構築
///
/// ペルソナ属性・読解レベルの指示・全処理目的（カタログ順）を含めます。
pub fn build_notice_request(
    fiduciary_name: &str,
    persona: &Persona,
    purposes: &PurposeRegistry,
) -> LlmRequest {
    let purpose_lines = purposes
        .iter()
        .map(|p| format!("- {} ({})", p.label, p.legal_section))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "You are a DPDP Act 2023 Notice Generation Agent. Generate a formal but clear \
DATA COLLECTION NOTICE for:

Data Fiduciary: {fiduciary}
User Persona: {label} - {description}
Reading Level Required: {level}

The notice must comply with DPDP Act 2023 Section 5 (Notice) requirements:
- Be itemized and specific
- Written in {directive}
- Cover each data processing purpose separately
- Include: what data is collected, why, how long it's kept, data principal rights
- Reference DPDP Act 2023 sections where applicable
- End with consent mechanism information per Section 6

Purposes to cover:
{purposes}

Format: Clear headings, short paragraphs, numbered points where helpful. Keep to 300-400 words.",
        fiduciary = fiduciary_name,
        label = persona.label,
        description = persona.description,
        level = persona.reading_level,
        directive = persona.reading_level.directive(),
        purposes = purpose_lines,
    );

    LlmRequest::new(vec![Message::user(prompt)])
        .with_temperature(NOTICE_TEMPERATURE)
        .with_max_tokens(NOTICE_MAX_TOKENS)
}

/// 翻訳リクエストを構築
pub fn build_translation_request(language: &Language, notice_text: &str) -> LlmRequest {
    let prompt = format!(
        "You are an expert translator specializing in Indian languages. Translate the following \
DPDP Act notice into {label} ({native}).

Requirements for translation:
- Maintain complete legal accuracy - all legal terms must be preserved
- Use simple, everyday words that are easily understood by the general public
- Keep all legal section references exactly as they are (§5, §6, §12, etc.)
- For complex legal terms that don't have direct equivalents, provide the English term in parentheses after the translated term
- Preserve all formatting including headings, numbered lists, and paragraph breaks
- The translation should sound natural to a native {label} speaker
- Avoid overly formal or Sanskritized language - use common colloquial terms

NOTICE TO TRANSLATE:
{notice}

Provide ONLY the translated text, no explanations, no notes, no English text except for terms in parentheses as specified.",
        label = language.label,
        native = language.native,
        notice = notice_text,
    );

    LlmRequest::new(vec![
        Message::system(TRANSLATION_SYSTEM_PROMPT),
        Message::user(prompt),
    ])
    .with_temperature(TRANSLATION_TEMPERATURE)
    .with_max_tokens(TRANSLATION_MAX_TOKENS)
}
