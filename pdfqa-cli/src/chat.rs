//! Interactive question loop.

use std::sync::Arc;

use anyhow::Result;
use pdfqa::openai::{OpenAIChatModel, OpenAIEmbeddingProvider};
use pdfqa::pgvector::PgVectorStore;
use pdfqa::{AnswerEngine, RagConfig, Settings};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

const EXIT_WORDS: [&str; 4] = ["sair", "exit", "quit", "q"];

/// What to do with one line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Exit,
    Skip,
    Ask(String),
}

pub fn classify_input(line: &str) -> Turn {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Turn::Skip;
    }
    if EXIT_WORDS.iter().any(|word| trimmed.eq_ignore_ascii_case(word)) {
        return Turn::Exit;
    }
    Turn::Ask(trimmed.to_string())
}

pub async fn run(settings: &Settings) -> Result<()> {
    let chat = settings.chat()?;

    let embedder = OpenAIEmbeddingProvider::from_settings(&chat.openai, &chat.embedding_model)?;
    let model = OpenAIChatModel::from_settings(&chat.openai, &chat.llm_model)?;
    let store = PgVectorStore::connect(&chat.database_url, chat.openai.request_timeout).await?;

    let engine = AnswerEngine::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(embedder))
        .vector_store(Arc::new(store))
        .language_model(Arc::new(model))
        .collection(chat.collection)
        .build()?;

    info!(collection = engine.collection(), "chat session started");
    converse(&engine).await
}

async fn converse(engine: &AnswerEngine) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("CLI de Chat (RAG): digite sua pergunta. Digite 'sair' para encerrar.");

    loop {
        let line = match editor.readline("Você: ") {
            Ok(line) => line,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("\nEncerrando.");
                break;
            }
            Err(e) => return Err(e.into()),
        };

        match classify_input(&line) {
            Turn::Skip => continue,
            Turn::Exit => {
                println!("Até mais!");
                break;
            }
            Turn::Ask(question) => {
                if let Err(e) = editor.add_history_entry(question.as_str()) {
                    debug!(error = %e, "history entry not recorded");
                }
                if let Some(answer) = engine.answer(&question).await {
                    println!("Assistente: {answer}\n");
                }
            }
        }
    }

    Ok(())
}
