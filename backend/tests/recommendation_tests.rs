//! Tests for the recommendation rule engine

use rust_decimal::Decimal;

use shared::{
    generate_recommendations, DeviationLevel, DeviationPolicy, DeviationStatus,
    RecommendationCategory, RecommendationContext, RecommendationPriority,
};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn ctx(
    status: DeviationStatus,
    level: DeviationLevel,
    yield_deviation: Option<Decimal>,
) -> RecommendationContext {
    RecommendationContext {
        status,
        level,
        yield_deviation_percent: yield_deviation,
    }
}

mod timing_rule {
    use super::*;

    #[test]
    fn fires_only_for_behind_status() {
        let policy = DeviationPolicy::default();

        let recs = generate_recommendations(
            &ctx(DeviationStatus::Behind, DeviationLevel::Medium, None),
            &policy,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, RecommendationCategory::Timing);
        assert_eq!(recs[0].priority, RecommendationPriority::High);

        for status in [
            DeviationStatus::OnTime,
            DeviationStatus::Ahead,
            DeviationStatus::Critical,
        ] {
            let recs = generate_recommendations(&ctx(status, DeviationLevel::Medium, None), &policy);
            assert!(
                recs.iter().all(|r| r.category != RecommendationCategory::Timing),
                "timing rule fired for {:?}",
                status
            );
        }
    }

    #[test]
    fn carries_a_concrete_action_checklist() {
        let policy = DeviationPolicy::default();
        let recs = generate_recommendations(
            &ctx(DeviationStatus::Behind, DeviationLevel::Low, None),
            &policy,
        );
        assert_eq!(recs[0].actions.len(), 3);
        assert!(recs[0].actions.iter().all(|a| !a.is_empty()));
    }
}

mod yield_rule {
    use super::*;

    /// expected 1000 vs actual 850 is a -15 % shortfall; past the -10 alert
    #[test]
    fn fires_below_the_alert_threshold() {
        let policy = DeviationPolicy::default();
        let recs = generate_recommendations(
            &ctx(
                DeviationStatus::OnTime,
                DeviationLevel::Low,
                Some(dec("-15")),
            ),
            &policy,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, RecommendationCategory::Yield);
        assert_eq!(recs[0].priority, RecommendationPriority::Medium);
    }

    #[test]
    fn threshold_is_strict() {
        let policy = DeviationPolicy::default();
        let at_threshold = generate_recommendations(
            &ctx(
                DeviationStatus::OnTime,
                DeviationLevel::Low,
                Some(dec("-10")),
            ),
            &policy,
        );
        assert!(at_threshold.is_empty());

        let just_below = generate_recommendations(
            &ctx(
                DeviationStatus::OnTime,
                DeviationLevel::Low,
                Some(dec("-10.01")),
            ),
            &policy,
        );
        assert_eq!(just_below.len(), 1);
    }

    /// No expected yield, no signal: the rule stays silent even when the
    /// harvest came in very low
    #[test]
    fn unset_yield_deviation_never_fires() {
        let policy = DeviationPolicy::default();
        let recs = generate_recommendations(
            &ctx(DeviationStatus::OnTime, DeviationLevel::Low, None),
            &policy,
        );
        assert!(recs.is_empty());
    }
}

mod process_rule {
    use super::*;

    #[test]
    fn fires_for_critical_level() {
        let policy = DeviationPolicy::default();
        let recs = generate_recommendations(
            &ctx(DeviationStatus::Ahead, DeviationLevel::Critical, None),
            &policy,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, RecommendationCategory::Process);
        assert_eq!(recs[0].priority, RecommendationPriority::Critical);
    }

    #[test]
    fn lower_levels_stay_silent() {
        let policy = DeviationPolicy::default();
        for level in [
            DeviationLevel::Low,
            DeviationLevel::Medium,
            DeviationLevel::High,
        ] {
            let recs = generate_recommendations(&ctx(DeviationStatus::OnTime, level, None), &policy);
            assert!(recs.is_empty(), "process rule fired for {:?}", level);
        }
    }
}

mod rule_composition {
    use super::*;

    /// Rules are independent and additive; all three can fire at once
    #[test]
    fn all_three_rules_fire_together() {
        let policy = DeviationPolicy::default();
        let recs = generate_recommendations(
            &ctx(
                DeviationStatus::Behind,
                DeviationLevel::Critical,
                Some(dec("-30")),
            ),
            &policy,
        );
        let categories: Vec<_> = recs.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                RecommendationCategory::Timing,
                RecommendationCategory::Yield,
                RecommendationCategory::Process,
            ]
        );
    }

    #[test]
    fn no_rule_fires_on_a_healthy_analysis() {
        let policy = DeviationPolicy::default();
        let recs = generate_recommendations(
            &ctx(DeviationStatus::OnTime, DeviationLevel::Low, Some(dec("5"))),
            &policy,
        );
        assert!(recs.is_empty());
    }

    /// A tightened alert threshold moves the firing point
    #[test]
    fn policy_threshold_is_respected() {
        let policy = DeviationPolicy {
            yield_alert_percent: Decimal::from(-5),
            ..DeviationPolicy::default()
        };
        let recs = generate_recommendations(
            &ctx(
                DeviationStatus::OnTime,
                DeviationLevel::Low,
                Some(dec("-7")),
            ),
            &policy,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, RecommendationCategory::Yield);
    }
}
