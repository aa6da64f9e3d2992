#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::constants::{ERROR_ANSWER_PREFIX, NO_CONTENT_ANSWER, SYSTEM_PROMPT};
    use crate::error::{FetchError, InputKind, QaError};
    use crate::knowledge::session::{build_prompt, QuerySession, SessionSettings};
    use crate::knowledge::test_support::{
        CannedGenerator, FakeFetcher, KeywordEmbedder, FOX_PAGE_URL,
    };
    use crate::knowledge::types::Role;

    const SHOP_URL: &str = "https://shop.example/faq";
    const VOLCANO_URL: &str = "https://volcano.example";
    const UNREACHABLE_URL: &str = "https://unreachable.example";

    struct Harness {
        session: QuerySession,
        fetcher: Arc<FakeFetcher>,
        embedder: Arc<KeywordEmbedder>,
        generator: Arc<CannedGenerator>,
    }

    fn harness_with(embedder: KeywordEmbedder, generator: CannedGenerator) -> Harness {
        let fetcher = Arc::new(
            FakeFetcher::with_fox_page()
                .with_page(
                    SHOP_URL,
                    "Shop FAQ",
                    "The shop opens at eight. Parking costs two dollars per hour.",
                )
                .with_page(VOLCANO_URL, "Volcanoes", "A volcano erupts molten rock.")
                .with_page("https://blank.example", "Blank", " \n "),
        );
        let embedder = Arc::new(embedder);
        let generator = Arc::new(generator);

        let settings = SessionSettings {
            max_chunk_size: 60,
            ..SessionSettings::default()
        };
        let session = QuerySession::new(
            fetcher.clone(),
            embedder.clone(),
            generator.clone(),
            settings,
        );

        Harness {
            session,
            fetcher,
            embedder,
            generator,
        }
    }

    fn harness() -> Harness {
        harness_with(
            KeywordEmbedder::new(),
            CannedGenerator::answering("Tickets cost ten dollars."),
        )
    }

    #[tokio::test]
    async fn test_ask_before_process_is_not_ready() {
        let mut h = harness();

        let err = h.session.ask("What does a ticket cost?").await.unwrap_err();

        assert!(matches!(err, QaError::NotReady));
        assert!(h.session.history().is_empty());
        assert_eq!(h.embedder.calls(), 0);
        assert!(h.generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_url_keeps_previous_state() {
        let mut h = harness();
        h.session.process(FOX_PAGE_URL).await.unwrap();
        h.session.ask("What does a ticket cost?").await.unwrap();
        let history_before = h.session.history().to_vec();

        let err = h.session.process(UNREACHABLE_URL).await.unwrap_err();

        match err {
            QaError::Fetch { url, source } => {
                assert_eq!(url, UNREACHABLE_URL);
                assert!(matches!(source, FetchError::Network(_)));
            }
            other => panic!("expected fetch failure, got {:?}", other),
        }
        assert_eq!(h.session.knowledge_base().unwrap().url(), FOX_PAGE_URL);
        assert_eq!(h.session.history(), history_before.as_slice());
        assert_eq!(h.session.last_process().unwrap().url, FOX_PAGE_URL);
    }

    #[tokio::test]
    async fn test_two_questions_append_four_alternating_turns() {
        let mut h = harness();
        h.session.process(FOX_PAGE_URL).await.unwrap();

        h.session.ask("What does a ticket cost?").await.unwrap();
        h.session.ask("  When does the shop open?  ").await.unwrap();

        let roles: Vec<Role> = h.session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Bot, Role::User, Role::Bot]);
        assert_eq!(h.session.history()[0].content, "What does a ticket cost?");
        assert_eq!(h.session.history()[2].content, "When does the shop open?");
        assert_eq!(h.session.history()[1].content, "Tickets cost ten dollars.");
    }

    #[tokio::test]
    async fn test_blank_url_rejected_before_fetching() {
        let mut h = harness();

        let err = h.session.process("   \t").await.unwrap_err();

        assert!(matches!(err, QaError::EmptyInput(InputKind::Url)));
        assert_eq!(h.fetcher.calls(), 0);
        assert!(!h.session.is_ready());
    }

    #[tokio::test]
    async fn test_blank_question_rejected_without_history() {
        let mut h = harness();
        h.session.process(FOX_PAGE_URL).await.unwrap();
        let embed_calls = h.embedder.calls();

        let err = h.session.ask(" \n ").await.unwrap_err();

        assert!(matches!(err, QaError::EmptyInput(InputKind::Question)));
        assert!(h.session.history().is_empty());
        assert_eq!(h.embedder.calls(), embed_calls);
    }

    #[tokio::test]
    async fn test_processing_new_url_resets_history() {
        let mut h = harness();
        h.session.process(FOX_PAGE_URL).await.unwrap();
        h.session.ask("What does a ticket cost?").await.unwrap();
        assert_eq!(h.session.history().len(), 2);

        let result = h.session.process(SHOP_URL).await.unwrap();

        assert_eq!(result.url, SHOP_URL);
        assert_eq!(result.title, "Shop FAQ");
        assert_eq!(result.chunk_count, h.session.knowledge_base().unwrap().len());
        assert!(h.session.history().is_empty());
        assert!(h.session.last_sources().is_empty());
        assert_eq!(h.session.knowledge_base().unwrap().url(), SHOP_URL);
    }

    #[tokio::test]
    async fn test_process_trims_url() {
        let mut h = harness();
        let result = h
            .session
            .process(&format!("  {}\n", FOX_PAGE_URL))
            .await
            .unwrap();

        assert_eq!(result.url, FOX_PAGE_URL);
        assert_eq!(result.title, "Animals");
        assert!(result.chunk_count >= 2);
    }

    #[tokio::test]
    async fn test_prompt_uses_ranked_context() {
        let mut h = harness();
        h.session.process(FOX_PAGE_URL).await.unwrap();

        let question = "What is the ticket price in dollars?";
        h.session.ask(question).await.unwrap();

        let sources = h.session.last_sources().to_vec();
        assert_eq!(sources.len(), 3);
        assert!(sources[0].text.contains("dollars"));
        assert!(sources[0].score > 0.0);
        assert!(sources.windows(2).all(|w| w[0].score >= w[1].score));

        let context = sources
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let requests = h.generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, SYSTEM_PROMPT);
        assert_eq!(requests[0].prompt, build_prompt(&context, question));
        assert_eq!(requests[0].max_tokens, 300);
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_top_k_limits_context() {
        let mut h = harness();
        h.session.process(FOX_PAGE_URL).await.unwrap();

        assert!(matches!(
            h.session.set_top_k(0),
            Err(QaError::InvalidSetting(_))
        ));
        assert_eq!(h.session.top_k(), 3);

        h.session.set_top_k(1).unwrap();
        h.session.ask("Is the dog lazy?").await.unwrap();

        assert_eq!(h.session.last_sources().len(), 1);
        assert!(h.session.last_sources()[0].text.contains("lazy dog"));
    }

    #[tokio::test]
    async fn test_generation_failure_recorded_as_bot_turn() {
        let mut h = harness_with(
            KeywordEmbedder::new(),
            CannedGenerator::scripted(vec![
                Err("model overloaded".to_string()),
                Ok("Ten dollars.".to_string()),
            ]),
        );
        h.session.process(FOX_PAGE_URL).await.unwrap();

        let err = h.session.ask("What does a ticket cost?").await.unwrap_err();

        assert!(matches!(err, QaError::Generation(_)));
        let history = h.session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Bot);
        assert!(history[1].content.starts_with(ERROR_ANSWER_PREFIX));
        assert!(history[1].content.contains("model overloaded"));
        assert!(h.session.is_ready());

        // The session keeps working after a failed answer
        let answer = h.session.ask("What does a ticket cost?").await.unwrap();
        assert_eq!(answer, "Ten dollars.");
        assert_eq!(h.session.history().len(), 4);
    }

    #[tokio::test]
    async fn test_question_embedding_failure_recorded() {
        let mut h = harness_with(
            KeywordEmbedder::failing_on("weather"),
            CannedGenerator::answering("unused"),
        );
        h.session.process(FOX_PAGE_URL).await.unwrap();

        let err = h.session.ask("How is the weather?").await.unwrap_err();

        assert!(matches!(err, QaError::Embedding(_)));
        assert_eq!(h.session.history().len(), 2);
        assert!(h.session.history()[1].content.contains("rate limit exceeded"));
        assert!(h.generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_during_build_keeps_previous() {
        let mut h = harness_with(
            KeywordEmbedder::failing_on("volcano"),
            CannedGenerator::answering("Ten dollars."),
        );
        h.session.process(FOX_PAGE_URL).await.unwrap();
        h.session.ask("What does a ticket cost?").await.unwrap();

        let err = h.session.process(VOLCANO_URL).await.unwrap_err();

        assert!(matches!(err, QaError::Embedding(_)));
        assert_eq!(h.session.knowledge_base().unwrap().url(), FOX_PAGE_URL);
        assert_eq!(h.session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_answers_without_providers() {
        let mut h = harness();
        let result = h.session.process("https://blank.example").await.unwrap();
        assert_eq!(result.chunk_count, 0);

        let embed_calls = h.embedder.calls();
        let answer = h.session.ask("Anything here?").await.unwrap();

        assert_eq!(answer, NO_CONTENT_ANSWER);
        assert_eq!(h.embedder.calls(), embed_calls);
        assert!(h.generator.requests().is_empty());
        assert_eq!(h.session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let mut h = harness_with(
            KeywordEmbedder::new(),
            CannedGenerator::answering("\n  Ten dollars for adults.  \n"),
        );
        h.session.process(FOX_PAGE_URL).await.unwrap();

        let answer = h.session.ask("What does a ticket cost?").await.unwrap();
        assert_eq!(answer, "Ten dollars for adults.");
        assert_eq!(h.session.history()[1].content, "Ten dollars for adults.");
    }

    #[tokio::test]
    async fn test_blank_model_answer_is_generation_failure() {
        let mut h = harness_with(KeywordEmbedder::new(), CannedGenerator::answering("   "));
        h.session.process(FOX_PAGE_URL).await.unwrap();

        let err = h.session.ask("What does a ticket cost?").await.unwrap_err();
        assert!(matches!(err, QaError::Generation(_)));
        assert_eq!(h.session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_history_keeps_knowledge_base() {
        let mut h = harness();
        h.session.process(FOX_PAGE_URL).await.unwrap();
        h.session.ask("What does a ticket cost?").await.unwrap();

        h.session.clear_history();

        assert!(h.session.history().is_empty());
        assert!(h.session.is_ready());
        h.session.ask("Is the dog lazy?").await.unwrap();
        assert_eq!(h.session.history().len(), 2);
    }
}
