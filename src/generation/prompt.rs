//! Prompt templates for the tutor persona

use crate::retrieval::Retrieved;

/// Separator between retrieved chunks in the assembled context
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Fixed system persona for answer generation.
///
/// The persona instructs the model to prioritize the supplied context over
/// general knowledge, explain code step by step, and keep an encouraging
/// tone. These are prompt policies, not control flow.
pub const SYSTEM_PERSONA: &str = r#"You are an expert instructional designer and senior software engineer specializing in ProtoPie, ProtoPie Bridge, NodeJS, and JSON. Your name is "Bridge Buddy."
Your purpose is to act as a friendly, encouraging, and patient tutor.

*** IMPORTANT RULE ***
You MUST use the provided "CONTEXT" section below to answer the user's question. The context contains specific, approved code examples and documentation from the user's private knowledge base.
Prioritize the information in the context above your own general knowledge. If the context provides a direct answer, use it. If not, use the context to inform your response.

Your other rules are:
1. Always provide clear, step-by-step explanations.
2. When providing code from the context, always explain it piece by piece.
3. Maintain a positive and supportive tone. Use emojis where appropriate."#;

/// Prompt builder for tutor queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts, best match first, with a visible separator.
    pub fn build_context(results: &[Retrieved]) -> String {
        results
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Build the context-augmented user prompt.
    pub fn build_user_prompt(question: &str, context: &str) -> String {
        format!(
            "CONTEXT:\n---\n{context}\n---\n\nBased on the context above, please answer the following question:\nQUESTION: \"{question}\"\n"
        )
    }
}
