//! Behaviour of the answer engine against test doubles.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{BrokenStore, CountingStore, RecordingModel, Reply, WordHashEmbedder};
use pdfqa::document::{Chunk, Metadata};
use pdfqa::{
    Answer, AnswerEngine, EmbeddingProvider, InMemoryVectorStore, NO_INFORMATION_ANSWER,
    RagConfig, RagError, VectorStore,
};
use serde_json::json;

const COLLECTION: &str = "pdf_manual";

struct Fixture {
    embedder: Arc<WordHashEmbedder>,
    store: Arc<CountingStore>,
    model: Arc<RecordingModel>,
    engine: AnswerEngine,
}

fn fixture(reply: Reply) -> Fixture {
    let embedder = Arc::new(WordHashEmbedder::new());
    let store = Arc::new(CountingStore::default());
    let model = Arc::new(RecordingModel::new(reply));
    let engine = AnswerEngine::builder()
        .config(RagConfig::default())
        .embedding_provider(embedder.clone())
        .vector_store(store.clone())
        .language_model(model.clone())
        .collection(COLLECTION)
        .build()
        .unwrap();
    Fixture { embedder, store, model, engine }
}

async fn seed(fixture: &Fixture, texts: &[&str]) {
    fixture.store.create_collection(COLLECTION, fixture.embedder.dimensions()).await.unwrap();
    let mut chunks = Vec::new();
    for (i, text) in texts.iter().enumerate() {
        let mut metadata = Metadata::new();
        metadata.insert("page".into(), json!(i));
        metadata.insert("source".into(), json!("manual.pdf"));
        chunks.push(Chunk {
            id: format!("doc-{i}"),
            text: text.to_string(),
            embedding: fixture.embedder.embed(text).await.unwrap(),
            metadata,
        });
    }
    fixture.store.upsert(COLLECTION, &chunks).await.unwrap();
    fixture.embedder.embed_calls.store(0, Ordering::SeqCst);
}

#[tokio::test]
async fn blank_questions_touch_nothing() {
    let f = fixture(Reply::Fixed("unused".into()));

    assert_eq!(f.engine.answer("").await, None);
    assert_eq!(f.engine.answer("   \t\n").await, None);

    assert_eq!(f.embedder.total_calls(), 0);
    assert_eq!(f.store.searches.load(Ordering::SeqCst), 0);
    assert_eq!(f.model.calls(), 0);
}

#[tokio::test]
async fn empty_retrieval_returns_sentinel_without_generation() {
    let f = fixture(Reply::Fixed("should not be used".into()));
    f.store.create_collection(COLLECTION, f.embedder.dimensions()).await.unwrap();

    let answer = f.engine.answer("Qual a autonomia da bateria?").await.unwrap();

    assert_eq!(answer, Answer::NoInformation);
    assert_eq!(answer.to_string(), NO_INFORMATION_ANSWER);
    assert_eq!(f.store.searches.load(Ordering::SeqCst), 1);
    assert_eq!(f.model.calls(), 0);
}

#[tokio::test]
async fn never_ingested_collection_returns_sentinel() {
    let model = Arc::new(RecordingModel::new(Reply::Fixed("should not be used".into())));
    let engine = AnswerEngine::builder()
        .embedding_provider(Arc::new(WordHashEmbedder::new()))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .language_model(model.clone())
        .collection("pdf_nunca")
        .build()
        .unwrap();

    assert_eq!(engine.answer("pergunta").await, Some(Answer::NoInformation));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn store_failure_becomes_failed_answer() {
    let model = Arc::new(RecordingModel::new(Reply::Fixed("unused".into())));
    let engine = AnswerEngine::builder()
        .embedding_provider(Arc::new(WordHashEmbedder::new()))
        .vector_store(Arc::new(BrokenStore))
        .language_model(model.clone())
        .collection(COLLECTION)
        .build()
        .unwrap();

    let answer = engine.answer("Qual a garantia?").await.unwrap();

    match answer {
        Answer::Failed(reason) => {
            assert!(reason.starts_with("Erro ao consultar o banco vetorial:"));
            assert!(reason.contains("connection refused"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn generation_failure_becomes_failed_answer() {
    let f = fixture(Reply::Fail);
    seed(&f, &["A garantia cobre dois anos."]).await;

    let answer = f.engine.answer("Qual a garantia?").await.unwrap();

    match answer {
        Answer::Failed(reason) => {
            assert!(reason.starts_with("Erro ao gerar resposta:"));
            assert!(reason.contains("rate limited"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(f.model.calls(), 1);
}

#[tokio::test]
async fn prompt_carries_ranked_context_and_question_at_fixed_temperature() {
    let f = fixture(Reply::Fixed("A garantia cobre dois anos.".into()));
    seed(
        &f,
        &["O suporte atende de segunda a sexta.", "A garantia cobre defeitos por dois anos."],
    )
    .await;

    let answer = f.engine.answer("  Quanto tempo dura a garantia?  ").await.unwrap();
    assert_eq!(answer, Answer::Grounded("A garantia cobre dois anos.".into()));

    let (prompt, temperature) = f.model.prompts.lock().unwrap()[0].clone();
    assert_eq!(temperature, 0.5);
    assert!(prompt.contains("PERGUNTA DO USUÁRIO:\nQuanto tempo dura a garantia?\n"));
    // The chunk sharing the most words with the question ranks first.
    assert!(prompt.contains("[Trecho 1 - página 1 - manual.pdf]\nA garantia cobre defeitos por dois anos."));
    assert!(prompt.contains("[Trecho 2 - página 0 - manual.pdf]"));
}

#[tokio::test]
async fn retrieval_is_capped_at_ten_excerpts() {
    let f = fixture(Reply::Fixed("ok".into()));
    let texts: Vec<String> = (0..15).map(|i| format!("trecho numero {i} sobre garantia")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    seed(&f, &refs).await;

    f.engine.answer("garantia").await.unwrap();

    let prompt = f.model.last_prompt().unwrap();
    assert_eq!(prompt.matches("[Trecho ").count(), 10);
    assert!(prompt.contains("[Trecho 10 "));
    assert!(!prompt.contains("[Trecho 11 "));
}

#[tokio::test]
async fn model_sentinel_reply_maps_to_no_information() {
    let f = fixture(Reply::Fixed(format!("{NO_INFORMATION_ANSWER}\n")));
    seed(&f, &["O suporte atende de segunda a sexta."]).await;

    let answer = f.engine.answer("Qual a cor do produto?").await.unwrap();
    assert_eq!(answer, Answer::NoInformation);
}

#[tokio::test]
async fn engine_is_shareable_across_tasks() {
    let f = fixture(Reply::Fixed("ok".into()));
    seed(&f, &["A garantia cobre dois anos."]).await;
    let engine = Arc::new(f.engine);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.answer(&format!("pergunta {i} garantia")).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(Answer::Grounded("ok".into())));
    }
    assert_eq!(f.model.calls(), 4);
}

#[test]
fn builder_names_every_missing_component() {
    let err = AnswerEngine::builder().collection("   ").build().err().unwrap();
    match err {
        RagError::MissingConfiguration { keys } => assert_eq!(
            keys,
            vec!["embedding_provider", "vector_store", "language_model", "collection"]
        ),
        other => panic!("unexpected error: {other}"),
    }
}
