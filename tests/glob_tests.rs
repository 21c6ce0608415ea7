use anyhow::Result;
use otterspec::glob::{GENERIC_SCORE, GlobBinding, GlobMatcherCache, GlobPattern, SHAPE_SCORE};
use otterspec::utils::logger;
use otterspec::{FindStrategy, SpecializerConfig};

const SUBJECTS: &[&str] = &["abcd", "axxbyycz", "abc", "a_b_c!", "xabcd", "", "aabbccdd"];

#[test]
fn repeated_pattern_compiles_once() -> Result<()> {
    logger::init_logging();
    let mut cache = GlobMatcherCache::new();
    let pattern = GlobPattern::new("a*b*c?");
    for subject in SUBJECTS {
        assert_eq!(cache.matches("a*b*c?", subject)?, pattern.matches_generic(subject));
    }
    // Equivalent spelling reuses the same matcher.
    assert!(cache.matches("a**b*c?", "abcd")?);

    let stats = cache.specializer().stats();
    assert_eq!(cache.specializer().generator().compiled(), 1);
    assert_eq!(stats.generated, 1);
    assert_eq!(stats.hits, SUBJECTS.len() as u64);
    assert_eq!(stats.live, 1);
    Ok(())
}

#[test]
fn best_prefers_exact_over_shape_over_generic() -> Result<()> {
    let mut cache = GlobMatcherCache::new();
    let generic = cache.seed_generic();
    let shape = cache.seed_shape("x*y");

    let store = cache.specializer().store();
    let lookup = store.find(&GlobBinding::request("a*b"), FindStrategy::Best);
    assert_eq!(lookup.id(), Some(shape));
    assert_eq!(lookup.score, SHAPE_SCORE);

    let lookup = store.find(&GlobBinding::request("a?b"), FindStrategy::Best);
    assert_eq!(lookup.id(), Some(generic));
    assert_eq!(lookup.score, GENERIC_SCORE);

    // Default policy accepts intermediate scores, so nothing is compiled.
    assert!(cache.matches("a*b", "a--b")?);
    assert!(!cache.matches("a?b", "a--b")?);
    assert_eq!(cache.specializer().stats().generated, 0);
    Ok(())
}

#[test]
fn threshold_forces_exact_compilation() -> Result<()> {
    let config = SpecializerConfig {
        accept_threshold: Some(SHAPE_SCORE.value() + 1),
        ..SpecializerConfig::default()
    };
    let mut cache = GlobMatcherCache::with_config(config);
    cache.seed_generic();
    cache.seed_shape("x*y");

    assert!(cache.matches("a*b", "ab")?);
    assert!(cache.matches("a*b", "aXXb")?);
    let stats = cache.specializer().stats();
    assert_eq!((stats.generated, stats.hits, stats.misses), (1, 1, 1));
    assert_eq!(stats.live, 3);
    Ok(())
}

#[test]
fn first_strategy_takes_earliest_acceptable_matcher() -> Result<()> {
    let config = SpecializerConfig {
        strategy: FindStrategy::First,
        ..SpecializerConfig::default()
    };
    let mut cache = GlobMatcherCache::with_config(config);
    let generic = cache.seed_generic();
    assert!(cache.matches("a*", "abc")?);
    assert_eq!(cache.specializer().generator().compiled(), 1);

    let lookup = cache
        .specializer()
        .store()
        .find(&GlobBinding::request("a*"), FindStrategy::First);
    assert_eq!(lookup.id(), Some(generic));
    Ok(())
}

#[test]
fn bounded_cache_keeps_recent_patterns() -> Result<()> {
    let config = SpecializerConfig {
        max_entries: Some(2),
        ..SpecializerConfig::default()
    };
    let mut cache = GlobMatcherCache::with_config(config);
    assert!(cache.matches("a*", "ab")?);
    assert!(cache.matches("b*", "bc")?);
    assert!(cache.matches("a*", "aa")?);
    assert!(cache.matches("c*", "cd")?);

    let store = cache.specializer().store();
    assert_eq!(store.len(), 2);
    assert!(store.find(&GlobBinding::request("b*"), FindStrategy::Best).specialization.is_none());
    assert!(store.find(&GlobBinding::request("a*"), FindStrategy::Best).score.is_match());
    assert_eq!(cache.specializer().stats().evictions, 1);
    Ok(())
}
