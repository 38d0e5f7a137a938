//! Prompt construction. Deterministic string assembly, no I/O.

use crate::content::Content;
use crate::memory::Turn;
use crate::provider::ChatMessage;

const RULES: &[&str] = &[
    "Don't make up information.",
    "Don't add services that don't exist.",
    "If the answer requires knowledge outside of the above content, state it.",
    "Answers should be strictly based on what you see above.",
    "The answer must be 100% compatible with the knowledge.",
    "Say who you are only if the user asks or if they greet you.",
    "Don't repeat your name in every answer.",
    "Provide short answers. One sentence if possible.",
];

/// System instructions + knowledge sections + rules. Built once per content load.
pub fn system_prompt(content: &Content) -> String {
    let mut out = format!(
        "You are {}, an AI Assistant for {}.\n\n\
         Use ONLY the information below.\n\
         If the user asks something outside of your knowledge base, reply:\n\"{}\"\n\n",
        content.assistant_name.trim(),
        content.company_name.trim(),
        content.replies.out_of_scope.trim()
    );
    out.push_str(&content.knowledge.render());
    out.push_str("Rules:\n");
    for (i, rule) in RULES.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, rule));
    }
    out.push_str("\nAnswer clearly, briefly, professionally.\n");
    out
}

/// `[system, ...history, user]` in that order.
pub fn build_messages(system: &str, history: &[Turn], user_message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(user_message));
    messages
}
