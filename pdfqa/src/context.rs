//! Context assembly and the grounding prompt.
//!
//! The prompt wording below is the answer contract: the model must answer
//! from the supplied excerpts only, or reply with [`NO_INFORMATION_ANSWER`]
//! word for word. Keep both strings byte-for-byte stable.

use serde_json::Value;

use crate::document::SearchResult;

/// Reply used when the context does not contain the answer.
pub const NO_INFORMATION_ANSWER: &str =
    "Não tenho informações necessárias para responder sua pergunta.";

/// Delimiter placed between excerpts in the assembled context.
pub const EXCERPT_DELIMITER: &str = "\n\n---\n\n";

const PROMPT_TEMPLATE: &str = r#"
CONTEXTO:
{contexto}

REGRAS:
- Responda somente com base no CONTEXTO.
- Se a informação não estiver explicitamente no CONTEXTO, responda:
  "Não tenho informações necessárias para responder sua pergunta."
- Nunca invente ou use conhecimento externo.
- Nunca produza opiniões ou interpretações além do que está escrito.

PERGUNTA DO USUÁRIO:
{pergunta}

RESPONDA A "PERGUNTA DO USUÁRIO"
"#;

/// Header line for the excerpt at `rank` (1-based).
///
/// `[Trecho 2 - página 5 - manual.pdf]`; page and source are omitted when absent.
fn excerpt_header(rank: usize, page: Option<&Value>, source: Option<&str>) -> String {
    let mut header = format!("[Trecho {rank}");
    if let Some(page) = page {
        match page {
            Value::String(s) => header.push_str(&format!(" - página {s}")),
            other => header.push_str(&format!(" - página {other}")),
        }
    }
    if let Some(source) = source {
        header.push_str(&format!(" - {source}"));
    }
    header.push(']');
    header
}

/// Concatenate retrieved chunks in rank order, each under its header.
pub fn assemble_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let header = excerpt_header(i + 1, result.chunk.page(), result.chunk.source());
            format!("{header}\n{}", result.chunk.text)
        })
        .collect::<Vec<_>>()
        .join(EXCERPT_DELIMITER)
}

/// Fill the grounding template with the assembled context and the question.
pub fn build_prompt(context: &str, question: &str) -> String {
    // Substitute the question last so braces in the context cannot capture it.
    PROMPT_TEMPLATE.replacen("{pergunta}", question, 1).replacen("{contexto}", context, 1)
}
