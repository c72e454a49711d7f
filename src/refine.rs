// refine.rs - Two-round search refinement
// Purpose: Re-run a search with its most common results negated so that the
//          long tail of rarely linked subdomains shows up

use crate::error::ReconResult;
use crate::extractor::FrequencyMap;
use crate::fetcher::PageFetcher;
use crate::logger::{RunLog, MILESTONE};
use crate::sources::SourceAdapter;

/// Negated terms appended to the round two query; more makes the URL too long
pub const MAX_EXCLUSIONS: usize = 20;

/// Distinct subdomains, most frequent first. Equal counts are ordered by name.
pub fn rank_by_frequency(subdomains: &FrequencyMap) -> Vec<&str> {
    let mut ranked: Vec<(&str, usize)> = subdomains
        .iter()
        .map(|(subdomain, count)| (subdomain.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().map(|(subdomain, _)| subdomain).collect()
}

/// `+-site:` terms for the top ranked entries, never negating `domain` itself
pub fn exclusion_clause<'a, I>(ranked: I, domain: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    ranked
        .into_iter()
        .take(MAX_EXCLUSIONS)
        .filter(|subdomain| *subdomain != domain)
        .map(|subdomain| format!("+-site:{}", subdomain))
        .collect()
}

/// Round two counts replace round one counts for shared keys
pub fn union(mut round1: FrequencyMap, round2: FrequencyMap) -> FrequencyMap {
    round1.extend(round2);
    round1
}

pub async fn discover<F>(
    adapter: &SourceAdapter,
    fetcher: &F,
    domain: &str,
    log: &RunLog,
) -> ReconResult<FrequencyMap>
where
    F: PageFetcher + ?Sized,
{
    let base_url = adapter.query_url(domain);

    log.log(format!("Fetching from {}: ROUND I", adapter.name()), MILESTONE);
    let round1 = adapter.fetch_and_extract(fetcher, &base_url, log).await?;
    log.log(
        format!(
            "First round of {} search returned {} subdomains",
            adapter.name(),
            round1.len()
        ),
        MILESTONE,
    );

    if round1.is_empty() {
        return Ok(round1);
    }

    let refined_url = {
        let ranked = rank_by_frequency(&round1);
        format!("{}{}", base_url, exclusion_clause(ranked, domain))
    };

    log.log(format!("Fetching from {}: ROUND II", adapter.name()), MILESTONE);
    let round2 = adapter.fetch_and_extract(fetcher, &refined_url, log).await?;
    log.log(
        format!(
            "Second round of {} search returned {} subdomains",
            adapter.name(),
            round2.len()
        ),
        MILESTONE,
    );

    Ok(union(round1, round2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SOURCES;
    use crate::testing::{google_page, ScriptedFetcher};

    fn counts(entries: &[(&str, usize)]) -> FrequencyMap {
        entries.iter().map(|(s, n)| (s.to_string(), *n)).collect()
    }

    fn google() -> SourceAdapter {
        let config = *SOURCES.iter().find(|s| s.name == "Google").unwrap();
        SourceAdapter::new(config).unwrap()
    }

    #[test]
    fn test_rank_by_frequency() {
        let map = counts(&[("b.example.org", 1), ("a.example.org", 3), ("c.example.org", 3)]);
        assert_eq!(
            rank_by_frequency(&map),
            vec!["a.example.org", "c.example.org", "b.example.org"]
        );
    }

    #[test]
    fn test_exclusion_skips_target_domain() {
        let clause = exclusion_clause(vec!["example.org", "www.example.org"], "example.org");
        assert_eq!(clause, "+-site:www.example.org");
    }

    #[test]
    fn test_exclusion_capped() {
        let names: Vec<String> = (0..40).map(|i| format!("host{}.example.org", i)).collect();
        let clause = exclusion_clause(names.iter().map(String::as_str), "example.org");

        assert_eq!(clause.matches("+-site:").count(), MAX_EXCLUSIONS);
        assert!(clause.contains("host19.example.org"));
        assert!(!clause.contains("host20.example.org"));
    }

    #[test]
    fn test_union_round_two_wins() {
        let merged = union(
            counts(&[("a", 3), ("b", 1)]),
            counts(&[("b", 5), ("c", 2)]),
        );
        assert_eq!(merged, counts(&[("a", 3), ("b", 5), ("c", 2)]));
    }

    #[tokio::test]
    async fn test_empty_first_round_skips_second() {
        let adapter = google();
        let base = adapter.query_url("example.org");
        let fetcher = ScriptedFetcher::new().page(&base, "<html><body></body></html>");

        let found = discover(&adapter, &fetcher, "example.org", &RunLog::disabled())
            .await
            .unwrap();

        assert!(found.is_empty());
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_two_rounds() {
        let adapter = google();
        let base = adapter.query_url("example.org");
        let refined = format!("{}+-site:www.example.org+-site:example.org.fake", base);
        let fetcher = ScriptedFetcher::new()
            .page(
                &base,
                &google_page(&[
                    ("www.example.org", 4),
                    ("example.org", 3),
                    ("example.org.fake", 1),
                ]),
            )
            .page(&refined, &google_page(&[("dev.example.org", 1), ("www.example.org", 1)]));

        let found = discover(&adapter, &fetcher, "example.org", &RunLog::disabled())
            .await
            .unwrap();

        assert_eq!(fetcher.requests(), vec![base, refined]);
        assert_eq!(found.len(), 4);
        assert_eq!(found["www.example.org"], 1);
        assert_eq!(found["example.org"], 3);
        assert_eq!(found["dev.example.org"], 1);
    }
}
