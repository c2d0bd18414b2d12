use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use newsrank_core::config::Config;
use newsrank_core::error::Error;
use newsrank_core::types::{Article, ImplementationCost, Persona, Recommendation};
use newsrank_eval::layers::{freshness, NEUTRAL};
use newsrank_eval::MultiLayerEvaluator;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn evaluator() -> MultiLayerEvaluator {
    MultiLayerEvaluator::new(Arc::new(Config::default()))
}

fn rich_engineering_article() -> Article {
    let mut a = Article {
        id: "rich".into(),
        title: "A practical guide to serving transformer models".into(),
        source: "arxiv".into(),
        source_tier: 1,
        published_date: Some(now()),
        content: "model api framework ".repeat(40),
        ..Article::default()
    };
    a.technical.implementation_ready = true;
    a.technical.code_available = true;
    a.technical.paper_link = Some("https://arxiv.org/abs/2501.00001".into());
    a.technical.github_repo = Some("https://github.com/example/serve".into());
    a.technical.reproducibility_score = 0.9;
    a.evidence.primary_sources = vec!["paper".into()];
    a.evidence.citations = vec!["ref".into()];
    a.evidence.expert_validation = true;
    a.summaries.action_items = vec!["try it".into()];
    a.summaries.key_takeaways = vec!["fast".into()];
    a.entities.technologies = vec!["transformer".into()];
    a
}

#[test]
fn unknown_persona_is_rejected_and_article_untouched() {
    let article = rich_engineering_article();
    let before = article.clone();
    let err = evaluator().evaluate(&article, "student").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(article, before);
}

#[test]
fn breakdown_keys_match_persona_weights() {
    let config = Config::default();
    let ev = evaluator();
    for persona in Persona::ALL {
        let result = ev.evaluate_at(&rich_engineering_article(), persona.as_str(), now()).expect("evaluate");
        let keys: BTreeSet<&String> = result.breakdown.keys().collect();
        let weight_keys: BTreeSet<&String> = config.persona_weights(persona).keys().collect();
        assert_eq!(keys, weight_keys);
        let sum: f64 = config.persona_weights(persona).values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(result.persona, persona);
    }
}

#[test]
fn rich_engineering_article_scores_high_for_engineers() {
    let result = evaluator().evaluate_at(&rich_engineering_article(), "engineer", now()).expect("evaluate");
    assert!((result.layers.trust - 1.0).abs() < 1e-9);
    assert!((result.layers.actionability - 1.0).abs() < 1e-9);
    assert!((result.layers.relevance - 1.0).abs() < 1e-9);
    assert_eq!(result.recommendation, Recommendation::HighlyRecommended);
    assert_eq!(result.recommendation, Recommendation::from_score(result.total_score));
    assert_eq!(result.breakdown["reproducibility"], 0.9);
}

#[test]
fn layer_total_is_the_weighted_sum() {
    let result = evaluator().evaluate_at(&rich_engineering_article(), "business", now()).expect("evaluate");
    let l = result.layers;
    let expected = 0.25 * l.quality + 0.30 * l.relevance + 0.15 * l.temporal + 0.15 * l.trust + 0.15 * l.actionability;
    assert!((result.total_score - expected).abs() < 1e-12);
}

#[test]
fn bare_article_gets_neutral_defaults() {
    let article = Article { id: "bare".into(), ..Article::default() };
    let result = evaluator().evaluate_at(&article, "engineer", now()).expect("evaluate");
    let temporal = evaluator().temporal(&article, now());
    assert_eq!(temporal.freshness, NEUTRAL);
    assert!((temporal.evergreen - 0.3).abs() < 1e-12);
    assert_eq!(result.breakdown["reproducibility"], NEUTRAL);
    assert_eq!(result.layers.relevance, 0.0);
    // unset tier resolves through the source lists to tier 3
    assert!((result.layers.trust - 0.1).abs() < 1e-12);
    assert_eq!(result.recommendation, Recommendation::Skip);
}

#[test]
fn freshness_two_half_lives_is_one_quarter() {
    let ev = evaluator();
    let recent = Article { published_date: Some(now() - Duration::hours(10)), ..Article::default() };
    let old = Article { published_date: Some(now() - Duration::hours(10 + 144)), ..Article::default() };
    let a = ev.temporal(&recent, now()).freshness;
    let b = ev.temporal(&old, now()).freshness;
    assert!((b - 0.25 * a).abs() < 1e-9, "{b} vs {a}");
    assert_eq!(freshness(Some(0.0), 72.0), 1.0);
}

#[test]
fn explicit_evergreen_score_overrides_indicators() {
    let mut article = Article { title: "An introduction and guide".into(), ..Article::default() };
    assert!((evaluator().temporal(&article, now()).evergreen - 0.7).abs() < 1e-12);
    article.evergreen_score = Some(0.95);
    assert_eq!(evaluator().temporal(&article, now()).evergreen, 0.95);
}

#[test]
fn business_breakdown_reflects_cost_and_roi() {
    let mut article = Article { id: "b".into(), ..Article::default() };
    article.business.implementation_cost = ImplementationCost::High;
    article.business.roi_indicators = vec!["30% savings".into()];
    let result = evaluator().evaluate_at(&article, "business", now()).expect("evaluate");
    assert!((result.breakdown["implementation_ease"] - 0.7).abs() < 1e-12);
    assert_eq!(result.breakdown["roi_potential"], 0.5);
    assert_eq!(result.breakdown["market_validation"], 0.2);
}

#[test]
fn evaluate_many_preserves_input_order() {
    let articles: Vec<Article> = (0..32).map(|i| Article { id: format!("a{i:02}"), ..rich_engineering_article() }).collect();
    let results = evaluator().evaluate_many(&articles, Persona::Engineer, now());
    assert_eq!(results.len(), 32);
    assert!(results.iter().all(|r| r.timestamp == now()));
}

prop_compose! {
    fn arb_article()(
        tier in 0u8..6,
        len in 0usize..4000,
        title_len in 0usize..200,
        age_hours in proptest::option::of(-100i64..20_000),
        flags in proptest::collection::vec(any::<bool>(), 12),
        reproducibility in -1.0f64..2.0,
        evergreen in proptest::option::of(-1.0f64..2.0),
    ) -> Article {
        let mut a = Article {
            id: "p".into(),
            title: "t".repeat(title_len),
            source_tier: tier,
            content: "x".repeat(len),
            published_date: age_hours.map(|h| now() - Duration::hours(h)),
            evergreen_score: evergreen,
            ..Article::default()
        };
        a.technical.implementation_ready = flags[0];
        a.technical.code_available = flags[1];
        if flags[2] { a.technical.paper_link = Some("p".into()); }
        if flags[3] { a.technical.github_repo = Some("g".into()); }
        a.technical.reproducibility_score = reproducibility;
        if flags[4] { a.business.case_studies = vec!["c".into()]; }
        if flags[5] { a.business.roi_indicators = vec!["r".into()]; }
        if flags[6] { a.business.funding_info = Some("f".into()); }
        if flags[7] { a.business.market_size = Some("m".into()); }
        if flags[8] { a.evidence.primary_sources = vec!["s".into()]; }
        if flags[9] { a.evidence.citations = vec!["c".into()]; }
        a.evidence.expert_validation = flags[10];
        if flags[11] { a.summaries.action_items = vec!["do".into()]; }
        a
    }
}

proptest! {
    #[test]
    fn all_scores_stay_in_unit_interval(article in arb_article()) {
        let ev = evaluator();
        for persona in Persona::ALL {
            let r = ev.evaluate_persona(&article, persona, now());
            prop_assert!((0.0..=1.0).contains(&r.total_score));
            prop_assert!((0.0..=1.0).contains(&r.breakdown_score));
            for (_, v) in r.layers.as_pairs() { prop_assert!((0.0..=1.0).contains(&v)); }
            for v in r.breakdown.values() { prop_assert!((0.0..=1.0).contains(v)); }
        }
    }
}
