//! Prompt text and fallback messages.

use campus_ledger::domain::Language;

use super::traits::{CollaboratorError, RecommendationRequest};

/// Activities included in a recommendation prompt.
pub const MAX_PROMPT_ACTIVITIES: usize = 15;

/// Activities a recommendation should name.
pub const RECOMMENDATION_COUNT: usize = 2;

pub const RECOMMEND_SYSTEM_PROMPT: &str =
    "你是一个专业的校园活动助手\"PKU Lens\"。请根据用户的身份和兴趣，从提供的活动列表中推荐最合适的2个活动。";

pub const SUMMARIZE_SYSTEM_PROMPT: &str = "你是一个乐于助人的助手，负责总结文本。";

pub fn recommend_user_prompt(request: &RecommendationRequest) -> String {
    let interests = request
        .interests
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let activities = request
        .activities
        .iter()
        .take(MAX_PROMPT_ACTIVITIES)
        .map(|a| format!("- {} ({}): {}...", a.title, a.category, a.description_prefix))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "用户信息：\n\
         - 身份: {role}\n\
         - 兴趣: {interests}\n\
         \n\
         可用活动列表:\n\
         {activities}\n\
         \n\
         请推荐{count}个活动。\n\
         要求：\n\
         1. 语气亲切自然。\n\
         2. 解释推荐理由。\n\
         3. 如果用户身份是 International Student，请用英文回答，否则用中文回答。",
        role = request.role,
        interests = interests,
        activities = activities,
        count = RECOMMENDATION_COUNT,
    )
}

pub fn summarize_user_prompt(title: &str, description: &str) -> String {
    format!(
        "请将以下活动描述总结为一句话（20字以内），用于手机通知推送。\n活动：{}\n描述：{}",
        title, description
    )
}

/// Text shown in place of a recommendation when the collaborator failed.
pub fn fallback_text(error: &CollaboratorError, language: Language) -> &'static str {
    use CollaboratorError::*;
    match (error, language) {
        (MissingApiKey, Language::English) => {
            "Configuration error: no API key found. Set AI_API_KEY to enable recommendations."
        }
        (MissingApiKey, Language::Chinese) => "配置错误：未找到 API Key。请设置环境变量 AI_API_KEY。",
        (RequestFailed(_), Language::English) => {
            "The AI service responded abnormally. Please try again later."
        }
        (RequestFailed(_), Language::Chinese) => "AI 服务响应异常，请稍后再试。",
        (NetworkError(_) | ParseError(_), Language::English) => {
            "Network connection failed. Please check your network settings."
        }
        (NetworkError(_) | ParseError(_), Language::Chinese) => "网络连接失败，请检查网络设置。",
        (EmptyContent, Language::English) => "No recommendation available yet.",
        (EmptyContent, Language::Chinese) => "暂无推荐结果。",
    }
}
