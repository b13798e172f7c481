//! Entity inference cascade
//!
//! Agent answers are unstructured prose. The inferencer guesses a subject
//! name (and, when the sentence shape allows, a role and organization) by
//! running an ordered list of pattern rules. Rules go from most to least
//! specific and the first rule that matches decides the result.

use std::collections::HashSet;

use gotham_core::{InferenceConfig, InferredEntity};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

// ============================================================================
// Rule Kinds
// ============================================================================

/// Rules of the cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// "that <name> is the <role> of <org>"
    RoleOfOrg,
    /// "that <name> is a <role>"
    Role,
    /// "saved to the graph: <name>"
    SavedToGraph,
    /// "CEO of <org> is <name>"
    CeoOf,
    /// First run of 2-4 title-cased words
    CapitalizedPhrase,
}

impl RuleKind {
    /// Evaluation order
    pub const CASCADE: [RuleKind; 5] = [
        Self::RoleOfOrg,
        Self::Role,
        Self::SavedToGraph,
        Self::CeoOf,
        Self::CapitalizedPhrase,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleOfOrg => "role_of_org",
            Self::Role => "role",
            Self::SavedToGraph => "saved_to_graph",
            Self::CeoOf => "ceo_of",
            Self::CapitalizedPhrase => "capitalized_phrase",
        }
    }

    /// Patterns tried for this rule, in order
    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Self::RoleOfOrg => &[r"(?i)that (.+?) is (?:the |an |a )?(.+?) of (.+?)(?:\.|$)"],
            Self::Role => &[r"(?i)that (.+?) is (?:the |an |a )?(.+?)(?:\.|$)"],
            Self::SavedToGraph => &[r"(?i)saved to (?:the )?graph[:\s-]*(.+?)(?:\.|$)"],
            // An explicit "is" or ":" separator is preferred so multi-word
            // organizations are not cut after their first word.
            Self::CeoOf => &[
                r"(?i)CEO of (.+?)(?:\s+is\s+|\s*:\s*)(.+?)(?:\.|$)",
                r"(?i)CEO of (.+?) (?:is|:)?\s*(.+?)(?:\.|$)",
            ],
            Self::CapitalizedPhrase => &[r"([A-Z][\w.'-]+(?:\s+[A-Z][\w.'-]+){1,3})"],
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Cascade Rule
// ============================================================================

/// One step of the cascade: compiled matchers plus the extraction logic of
/// its kind
#[derive(Debug, Clone)]
pub struct CascadeRule {
    kind: RuleKind,
    patterns: Vec<Regex>,
}

impl CascadeRule {
    /// Compile the patterns of a rule kind
    pub fn new(kind: RuleKind) -> Result<Self, regex::Error> {
        let patterns = kind
            .patterns()
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kind, patterns })
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Apply this rule alone. Returns `None` when the rule does not fire.
    pub fn apply(&self, text: &str, denylist: &HashSet<String>) -> Option<InferredEntity> {
        self.patterns
            .iter()
            .filter_map(|regex| regex.captures(text))
            .find_map(|caps| self.extract(&caps, denylist))
    }

    fn extract(&self, caps: &Captures<'_>, denylist: &HashSet<String>) -> Option<InferredEntity> {
        let group = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match self.kind {
            RuleKind::RoleOfOrg => Some(
                InferredEntity::named(group(1)?)
                    .with_role(group(2)?)
                    .with_org(group(3)?),
            ),
            RuleKind::Role => Some(InferredEntity::named(group(1)?).with_role(group(2)?)),
            RuleKind::SavedToGraph => Some(InferredEntity::named(group(1)?)),
            RuleKind::CeoOf => {
                let org = group(1)?;
                Some(InferredEntity::named(group(2)?).with_role("CEO").with_org(org))
            }
            RuleKind::CapitalizedPhrase => {
                let phrase = group(1)?;
                if denylist.contains(&phrase) {
                    tracing::debug!("Capitalized phrase '{}' is denylisted", phrase);
                    return None;
                }
                Some(InferredEntity::named(phrase))
            }
        }
    }
}

// ============================================================================
// Inferencer
// ============================================================================

/// Ordered rule cascade with a denylist of product/UI names
#[derive(Debug, Clone)]
pub struct EntityInferencer {
    rules: Vec<CascadeRule>,
    denylist: HashSet<String>,
}

impl EntityInferencer {
    /// Create an inferencer with the default cascade and denylist
    pub fn new() -> Self {
        Self::from_config(&InferenceConfig::default())
    }

    /// Create an inferencer using a configured denylist
    pub fn from_config(config: &InferenceConfig) -> Self {
        let mut inferencer = Self {
            rules: Vec::with_capacity(RuleKind::CASCADE.len()),
            denylist: HashSet::new(),
        };
        for kind in RuleKind::CASCADE {
            inferencer.add_rule(kind);
        }
        inferencer.with_denylist(config.denylist.iter().cloned())
    }

    /// Replace the denylist
    pub fn with_denylist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denylist = names.into_iter().map(Into::into).collect();
        self
    }

    fn add_rule(&mut self, kind: RuleKind) {
        match CascadeRule::new(kind) {
            Ok(rule) => self.rules.push(rule),
            Err(e) => tracing::warn!("Skipping inference rule {}: {}", kind, e),
        }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[CascadeRule] {
        &self.rules
    }

    /// Run the cascade and report which rule fired
    pub fn infer_with_rule(&self, cleaned: &str) -> Option<(RuleKind, InferredEntity)> {
        self.rules.iter().find_map(|rule| {
            rule.apply(cleaned, &self.denylist)
                .map(|entity| (rule.kind(), entity))
        })
    }

    /// Guess subject / role / organization from sanitized text. Fields stay
    /// `None` when no rule matches; blank text never matches.
    pub fn infer(&self, cleaned: &str) -> InferredEntity {
        match self.infer_with_rule(cleaned) {
            Some((kind, entity)) => {
                tracing::debug!("Inference rule {} matched", kind);
                entity
            }
            None => InferredEntity::default(),
        }
    }
}

impl Default for EntityInferencer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: RuleKind) -> CascadeRule {
        CascadeRule::new(kind).unwrap()
    }

    fn no_denylist() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_all_rules_compile() {
        let inferencer = EntityInferencer::new();
        let kinds: Vec<RuleKind> = inferencer.rules().iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, RuleKind::CASCADE.to_vec());
    }

    #[test]
    fn test_role_of_org_rule() {
        let entity = rule(RuleKind::RoleOfOrg)
            .apply("We learned that Jane Doe is the CFO of Acme Corp.", &no_denylist())
            .unwrap();
        assert_eq!(
            entity,
            InferredEntity::named("Jane Doe")
                .with_role("CFO")
                .with_org("Acme Corp")
        );
    }

    #[test]
    fn test_role_rule() {
        let entity = rule(RuleKind::Role)
            .apply("Sources confirm that Ed Bastian is an executive", &no_denylist())
            .unwrap();
        assert_eq!(entity.name.as_deref(), Some("Ed Bastian"));
        assert_eq!(entity.role.as_deref(), Some("executive"));
        assert_eq!(entity.org, None);
    }

    #[test]
    fn test_saved_to_graph_rule() {
        let entity = rule(RuleKind::SavedToGraph)
            .apply("Saved to the graph: Acme Holdings.", &no_denylist())
            .unwrap();
        assert_eq!(entity, InferredEntity::named("Acme Holdings"));

        let entity = rule(RuleKind::SavedToGraph)
            .apply("saved to graph - Delta Air Lines", &no_denylist())
            .unwrap();
        assert_eq!(entity.name.as_deref(), Some("Delta Air Lines"));
    }

    #[test]
    fn test_ceo_of_rule() {
        let entity = rule(RuleKind::CeoOf)
            .apply("The CEO of Delta Air Lines is Ed Bastian.", &no_denylist())
            .unwrap();
        assert_eq!(entity.name.as_deref(), Some("Ed Bastian"));
        assert_eq!(entity.org.as_deref(), Some("Delta Air Lines"));
        assert_eq!(entity.role.as_deref(), Some("CEO"));

        let entity = rule(RuleKind::CeoOf)
            .apply("CEO of Acme: Jane Doe", &no_denylist())
            .unwrap();
        assert_eq!(entity.name.as_deref(), Some("Jane Doe"));
        assert_eq!(entity.org.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_ceo_of_without_separator() {
        let entity = rule(RuleKind::CeoOf)
            .apply("CEO of Acme Jane Doe.", &no_denylist())
            .unwrap();
        assert_eq!(entity.org.as_deref(), Some("Acme"));
        assert_eq!(entity.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_capitalized_phrase_rule() {
        let entity = rule(RuleKind::CapitalizedPhrase)
            .apply("results show Delta Air Lines grew revenue", &no_denylist())
            .unwrap();
        assert_eq!(entity.name.as_deref(), Some("Delta Air Lines"));

        assert!(rule(RuleKind::CapitalizedPhrase)
            .apply("Nothing here is capitalized twice", &no_denylist())
            .is_none());
    }

    #[test]
    fn test_capitalized_phrase_denylist() {
        let denylist: HashSet<String> = ["Project Gotham".to_string()].into_iter().collect();
        assert!(rule(RuleKind::CapitalizedPhrase)
            .apply("Project Gotham stored the result", &denylist)
            .is_none());
    }

    #[test]
    fn test_cascade_priority() {
        let inferencer = EntityInferencer::new();

        // Both the role rule and the capitalized fallback could match
        let (kind, entity) = inferencer
            .infer_with_rule("Mission Console found that Jane Doe is the CFO of Acme Corp.")
            .unwrap();
        assert_eq!(kind, RuleKind::RoleOfOrg);
        assert_eq!(entity.name.as_deref(), Some("Jane Doe"));

        let (kind, _) = inferencer
            .infer_with_rule("Saved to the graph: Acme Holdings.")
            .unwrap();
        assert_eq!(kind, RuleKind::SavedToGraph);
    }

    #[test]
    fn test_infer_examples() {
        let inferencer = EntityInferencer::new();

        assert_eq!(
            inferencer.infer("We learned that Jane Doe is the CFO of Acme Corp."),
            InferredEntity::named("Jane Doe")
                .with_role("CFO")
                .with_org("Acme Corp")
        );
        assert_eq!(
            inferencer.infer("Saved to the graph: Acme Holdings."),
            InferredEntity::named("Acme Holdings")
        );
    }

    #[test]
    fn test_default_denylist_blocks_console_name() {
        let inferencer = EntityInferencer::new();
        assert!(inferencer
            .infer("Mission Console finished the run")
            .is_empty());
    }

    #[test]
    fn test_nothing_matches() {
        let inferencer = EntityInferencer::new();
        assert_eq!(inferencer.infer("no entities here."), InferredEntity::default());
        assert_eq!(inferencer.infer(""), InferredEntity::default());
    }

    #[test]
    fn test_blank_text_infers_nothing() {
        let inferencer = EntityInferencer::new();
        assert!(inferencer.infer("").is_empty());
        assert!(inferencer.infer("   ").is_empty());
        assert!(inferencer.infer_with_rule("").is_none());
    }

    #[test]
    fn test_custom_denylist() {
        let inferencer = EntityInferencer::new().with_denylist(["Acme Holdings"]);
        assert!(inferencer.infer("Acme Holdings reported earnings").is_empty());
    }
}
