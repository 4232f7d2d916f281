//! Rule-based remediation recommendations
//!
//! A declarative table of independent rules. Each rule pairs a predicate over
//! the analysis result with a static recommendation template; any subset of
//! rules may fire for one analysis and no deduplication is applied.

use rust_decimal::Decimal;

use super::policy::DeviationPolicy;
use crate::models::{
    DeviationLevel, DeviationStatus, Recommendation, RecommendationCategory,
    RecommendationPriority,
};

/// The slice of an analysis the rules look at
#[derive(Debug, Clone, Copy)]
pub struct RecommendationContext {
    pub status: DeviationStatus,
    pub level: DeviationLevel,
    pub yield_deviation_percent: Option<Decimal>,
}

struct RecommendationRule {
    category: RecommendationCategory,
    priority: RecommendationPriority,
    title: &'static str,
    description: &'static str,
    impact: &'static str,
    effort: &'static str,
    actions: &'static [&'static str],
    applies: fn(&RecommendationContext, &DeviationPolicy) -> bool,
}

impl RecommendationRule {
    fn build(&self) -> Recommendation {
        Recommendation {
            category: self.category,
            title: self.title.to_string(),
            description: self.description.to_string(),
            priority: self.priority,
            impact: self.impact.to_string(),
            effort: self.effort.to_string(),
            actions: self.actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

const RULES: &[RecommendationRule] = &[
    RecommendationRule {
        category: RecommendationCategory::Timing,
        priority: RecommendationPriority::High,
        title: "Recover the cultivation schedule",
        description: "Recorded farming stages are falling behind the expected \
                      timeline for this harvest window.",
        impact: "High",
        effort: "Medium",
        actions: &[
            "Intensify field care on the lagging areas",
            "Review the fertilizer and pesticide regimen with the field officer",
            "Monitor weather forecasts and plan outdoor work around them",
        ],
        applies: |ctx, _| ctx.status == DeviationStatus::Behind,
    },
    RecommendationRule {
        category: RecommendationCategory::Yield,
        priority: RecommendationPriority::Medium,
        title: "Close the yield gap",
        description: "Recorded yield is trailing the committed amount beyond \
                      the alert threshold.",
        impact: "Medium",
        effort: "Medium",
        actions: &[
            "Check soil nutrition and water supply on the affected areas",
            "Apply advanced cultivation practices for the current stage",
            "Consult an agronomist before the next stage begins",
        ],
        applies: |ctx, policy| {
            ctx.yield_deviation_percent
                .is_some_and(|y| y < policy.yield_alert_percent)
        },
    },
    RecommendationRule {
        category: RecommendationCategory::Process,
        priority: RecommendationPriority::Critical,
        title: "Re-plan the cultivation process",
        description: "The deviation magnitude indicates the current plan is no \
                      longer achievable without intervention.",
        impact: "High",
        effort: "High",
        actions: &[
            "Run a root-cause review with the farmer and field officer",
            "Re-plan the remaining cultivation schedule",
            "Benchmark against comparable seasons that finished on target",
        ],
        applies: |ctx, _| ctx.level == DeviationLevel::Critical,
    },
];

/// Evaluate every rule against the analysis; results keep table order
pub fn generate_recommendations(
    ctx: &RecommendationContext,
    policy: &DeviationPolicy,
) -> Vec<Recommendation> {
    RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx, policy))
        .map(RecommendationRule::build)
        .collect()
}
