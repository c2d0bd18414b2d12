use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};

use newsrank_core::types::{Article, TopicCount};
use newsrank_text::normalize_entity;

/// Most-mentioned companies, technologies and concepts among articles
/// published in `[now - window_days, now]`. Each article counts a topic
/// once. Sorted by count desc, then topic asc. A window reaching past the
/// earliest representable date has no lower bound.
pub fn trending_topics<'a>(
    articles: impl IntoIterator<Item = &'a Article>,
    window_days: u32,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<TopicCount> {
    let since = Duration::try_days(i64::from(window_days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for article in articles {
        let Some(published) = article.published_date else { continue };
        if published < since || published > now { continue; }
        let e = &article.entities;
        let topics: BTreeSet<String> = e
            .companies
            .iter()
            .chain(&e.technologies)
            .chain(&e.concepts)
            .map(|t| normalize_entity(t))
            .filter(|t| !t.is_empty())
            .collect();
        for topic in topics { *counts.entry(topic).or_insert(0) += 1; }
    }
    let mut ranked: Vec<TopicCount> = counts.into_iter().map(|(topic, count)| TopicCount { topic, count }).collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    ranked.truncate(limit);
    ranked
}
