//! Topic save, ranking, listing and cascade delete E2E tests.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use e2e_tests::{ids, parse_sentences, sentence, words, TestHarness, BEACH, MALL, NEW_YORK};
use kai_topics::TopicsError;
use kai_types::{Token, TopicSettings};

#[test]
fn test_more_mentions_rank_higher() {
    let harness = TestHarness::new();
    let topics = harness.topics();

    let one = vec![sentence(&[("boat", "NN"), ("rope", "NN")])];
    let two = vec![
        sentence(&[("boat", "NN")]),
        sentence(&[("boats", "NNS"), ("rope", "NN")]),
    ];
    topics.save_topic("one", "boat rope", &one).unwrap();
    topics.save_topic("two", "boat. boats rope", &two).unwrap();

    let query = [Token::new("boat", "NN")];
    let ranked = topics.ranker().get_top_topics(&query).unwrap();
    let names: Vec<&str> = ranked.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(names, vec!["two", "one"]);
    assert!((ranked[0].score - 1.98).abs() < 1e-9);
    assert!((ranked[1].score - 1.0).abs() < 1e-9);

    // a further mention never lowers a topic
    topics
        .ranker()
        .index_topic(
            "one",
            &[
                sentence(&[("boat", "NN")]),
                sentence(&[("boat", "NN")]),
                sentence(&[("boat", "NN")]),
            ],
        )
        .unwrap();
    let ranked = topics.ranker().get_top_topics(&query).unwrap();
    assert_eq!(ranked[0].topic, "one");
}

#[test]
fn test_ranking_ignores_non_nouns_and_verbs() {
    let harness = TestHarness::new();
    let topics = harness.topics();
    topics
        .save_topic("beach", "beach", &parse_sentences(BEACH))
        .unwrap();
    topics.save_topic("mall", "mall", &parse_sentences(MALL)).unwrap();

    let only_function_words = [Token::new("the", "DT"), Token::new("to", "IN")];
    assert!(topics
        .ranker()
        .get_top_topics(&only_function_words)
        .unwrap()
        .is_empty());

    let query = [Token::new("Peter", "NNP"), Token::new("movie", "NN")];
    let ranked = topics.ranker().get_top_topics(&query).unwrap();
    let names: Vec<&str> = ranked.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(names, vec!["mall", "beach"]);
}

#[test]
fn test_saved_topic_is_searchable_in_topic_and_mirror() {
    let harness = TestHarness::new();
    let topics = harness.topics();
    let beach = parse_sentences(BEACH);
    topics.save_topic("beach", "beach day", &beach).unwrap();

    for namespace in ["beach", "global"] {
        let found = harness.finder().find_documents(&words("boat"), namespace, 0).unwrap();
        assert_eq!(ids(&found), BTreeSet::from([beach[0].id]), "namespace {}", namespace);
    }

    let texts = harness.sentence_store().find_text(&words("beach"), "beach").unwrap();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].topic, "beach");
    assert!(texts[0].text.starts_with("Peter and Davis Patrick went to the beach"));
}

#[test]
fn test_delete_topic_removes_every_namespace() {
    let harness = TestHarness::new();
    let settings = TopicSettings {
        mirror_namespaces: vec!["global".to_string(), "archive".to_string()],
        ..TopicSettings::default()
    };
    let topics = harness.topics_with(settings);

    let beach = parse_sentences(BEACH);
    let mall = parse_sentences(MALL);
    topics.save_topic("beach", "beach day", &beach).unwrap();
    topics.save_topic("mall", "mall day", &mall).unwrap();

    let summary = topics.delete_topic("beach").unwrap();
    assert_eq!(summary.sentences, 1);
    assert_eq!(summary.failures, 0);

    for namespace in ["beach", "global", "archive"] {
        let found = harness.finder().find_documents(&words("boat"), namespace, 0).unwrap();
        assert!(found.is_empty(), "namespace {}", namespace);
        let found = harness.finder().find_documents(&words("Peter"), namespace, 0).unwrap();
        let expected = if namespace == "beach" {
            BTreeSet::new()
        } else {
            BTreeSet::from([mall[0].id])
        };
        assert_eq!(ids(&found), expected, "namespace {}", namespace);
    }

    assert!(topics.get_topic("beach").unwrap().is_none());
    assert!(topics.get_unindexes_for_topic("beach").unwrap().is_empty());
    assert!(harness.sentence_store().get_sentence(beach[0].id).unwrap().is_none());
    assert!(harness.sentence_store().get_sentence(mall[0].id).unwrap().is_some());

    let ranked = topics
        .ranker()
        .get_top_topics(&[Token::new("boat", "NN"), Token::new("Peter", "NNP")])
        .unwrap();
    let names: Vec<&str> = ranked.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(names, vec!["mall"]);
}

#[test]
fn test_delete_all_topics_leaves_empty_store() {
    let harness = TestHarness::new();
    let topics = harness.topics();
    topics.save_topic("beach", "b", &parse_sentences(BEACH)).unwrap();
    topics.save_topic("york", "y", &parse_sentences(NEW_YORK)).unwrap();

    topics.delete_topic("beach").unwrap();
    topics.delete_topic("york").unwrap();

    let stats = harness.storage.get_stats().unwrap();
    assert_eq!(stats.topic_rows, 0);
    assert_eq!(stats.topic_index_rows, 0);
    assert_eq!(stats.topic_unindex_rows, 0);
    assert_eq!(stats.word_index_rows, 0);
    assert_eq!(stats.word_unindex_rows, 0);
    assert_eq!(stats.sentence_rows, 0);
}

#[test]
fn test_list_topics_pagination() {
    let harness = TestHarness::new();
    let topics = harness.topics();
    let names = ["delta", "alpha", "echo", "charlie", "bravo"];
    for name in names {
        topics
            .save_topic(name, name, &[sentence(&[(name, "NN")])])
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut after: Option<String> = None;
    loop {
        let page = topics.list_topics(after.as_deref(), 2).unwrap();
        if page.is_empty() {
            break;
        }
        assert!(page.len() <= 2);
        after = page.last().map(|t| t.name.clone());
        seen.extend(page.into_iter().map(|t| t.name));
    }
    assert_eq!(seen, vec!["alpha", "bravo", "charlie", "delta", "echo"]);

    assert!(matches!(
        topics.list_topics(None, 0),
        Err(TopicsError::InvalidInput(_))
    ));
}
