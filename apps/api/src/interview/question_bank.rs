//! Question Bank — immutable template catalogue injected into the generator.
//!
//! Categories keep their declaration order so selection is reproducible for a
//! given random source.

use crate::interview::models::Complexity;

/// Placeholder replaced with the session's target role in behavioral templates.
pub const ROLE_PLACEHOLDER: &str = "{role}";

const BEHAVIORAL_POOL: &[&str] = &[
    "Tell me about a time you faced a difficult challenge at work and how you handled it.",
    "Describe a situation where you disagreed with a teammate. How did you resolve it?",
    "Give an example of a goal you set and how you achieved it.",
    "Tell me about a time you had to learn something new quickly.",
    "Describe a project you are proud of and your role in it.",
    "Why are you interested in the {role} position, and what would you bring to it?",
];

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionTemplate {
    pub text: String,
    pub complexity: Complexity,
}

impl QuestionTemplate {
    pub fn new(text: impl Into<String>, complexity: Complexity) -> Self {
        Self {
            text: text.into(),
            complexity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    categories: Vec<(String, Vec<QuestionTemplate>)>,
    behavioral: Vec<String>,
}

impl QuestionBank {
    /// Builds a bank from explicit category pools. Keys are trimmed and lowercased;
    /// blank keys and empty pools are dropped.
    pub fn new(categories: Vec<(String, Vec<QuestionTemplate>)>, behavioral: Vec<String>) -> Self {
        let categories = categories
            .into_iter()
            .filter(|(_, templates)| !templates.is_empty())
            .map(|(key, templates)| (key.trim().to_lowercase(), templates))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self {
            categories,
            behavioral,
        }
    }

    /// Returns the category whose key occurs in `skill` (already lowercased).
    /// The longest matching key wins so "javascript" never resolves to "java".
    pub fn match_category(&self, skill: &str) -> Option<(&str, &[QuestionTemplate])> {
        self.categories
            .iter()
            .filter(|(key, _)| skill.contains(key.as_str()))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then(b.cmp(a)))
            .map(|(key, templates)| (key.as_str(), templates.as_slice()))
    }

    pub fn behavioral_pool(&self) -> &[String] {
        &self.behavioral
    }

    pub fn category_keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(key, _)| key.as_str())
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        use Complexity::*;

        let t = QuestionTemplate::new;
        let categories = vec![
            (
                "javascript",
                vec![
                    t("Explain closures in JavaScript and describe a bug you solved with one.", Medium),
                    t("How does the JavaScript event loop schedule promises versus timers?", Hard),
                    t("What is the difference between let, const and var?", Easy),
                ],
            ),
            (
                "typescript",
                vec![
                    t("How do generics improve type safety in TypeScript? Give an example.", Medium),
                    t("When would you reach for a discriminated union in TypeScript?", Medium),
                ],
            ),
            (
                "react",
                vec![
                    t("How do you decide between local component state and a global store in React?", Medium),
                    t("Explain how React reconciliation works and how keys affect it.", Hard),
                    t("What problems do React hooks solve compared to class components?", Easy),
                ],
            ),
            (
                "node",
                vec![
                    t("How would you structure error handling in a Node.js API?", Medium),
                    t("Describe how you would find and fix a memory leak in a Node.js service.", Hard),
                ],
            ),
            (
                "python",
                vec![
                    t("Explain the difference between lists, tuples and sets in Python.", Easy),
                    t("How does the GIL affect concurrent Python programs?", Hard),
                    t("Describe a Python project where you improved performance.", Medium),
                ],
            ),
            (
                "java",
                vec![
                    t("How does garbage collection work in the JVM?", Hard),
                    t("Explain the difference between an interface and an abstract class in Java.", Easy),
                ],
            ),
            (
                "sql",
                vec![
                    t("How do you diagnose and optimize a slow SQL query?", Medium),
                    t("Explain the trade-offs of database normalization.", Medium),
                ],
            ),
            (
                "mongodb",
                vec![
                    t("How do you design a MongoDB schema: embedding versus referencing?", Medium),
                    t("How do indexes work in MongoDB and when can they hurt?", Hard),
                ],
            ),
            (
                "aws",
                vec![
                    t("How would you design a highly available service on AWS?", Hard),
                    t("Describe how you manage secrets and IAM permissions on AWS.", Medium),
                ],
            ),
            (
                "docker",
                vec![
                    t("How do you keep Docker images small and secure?", Medium),
                    t("Explain the difference between a container and a virtual machine.", Easy),
                ],
            ),
            (
                "machine learning",
                vec![
                    t("How do you detect and handle overfitting in a machine learning model?", Medium),
                    t("Walk through how you would take a model from prototype to production.", Hard),
                ],
            ),
        ];

        QuestionBank::new(
            categories
                .into_iter()
                .map(|(key, templates)| (key.to_string(), templates))
                .collect(),
            BEHAVIORAL_POOL.iter().map(|q| q.to_string()).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_key_wins() {
        let bank = QuestionBank::default();
        let (key, _) = bank.match_category("javascript").unwrap();
        assert_eq!(key, "javascript");
        let (key, _) = bank.match_category("java").unwrap();
        assert_eq!(key, "java");
    }

    #[test]
    fn test_substring_match_on_decorated_skill() {
        let bank = QuestionBank::default();
        let (key, _) = bank.match_category("react.js").unwrap();
        assert_eq!(key, "react");
        let (key, _) = bank.match_category("node.js (express)").unwrap();
        assert_eq!(key, "node");
    }

    #[test]
    fn test_unknown_skill_has_no_category() {
        let bank = QuestionBank::default();
        assert!(bank.match_category("cobol").is_none());
    }

    #[test]
    fn test_empty_pools_are_dropped_and_keys_normalized() {
        let rust = QuestionTemplate::new("Explain ownership.", Complexity::Medium);
        let bank = QuestionBank::new(
            vec![
                ("  Rust ".to_string(), vec![rust]),
                ("go".to_string(), vec![]),
            ],
            vec![],
        );
        assert_eq!(bank.category_keys().collect::<Vec<_>>(), vec!["rust"]);
        assert!(bank.match_category("golang").is_none());
    }

    #[test]
    fn test_blank_keys_are_dropped() {
        let template = QuestionTemplate::new("Explain pointers.", Complexity::Hard);
        let bank = QuestionBank::new(vec![("   ".to_string(), vec![template])], vec![]);
        assert_eq!(bank.category_keys().count(), 0);
        assert!(bank.match_category("cobol").is_none());
    }

    #[test]
    fn test_default_bank_has_enough_behavioral_questions() {
        assert!(QuestionBank::default().behavioral_pool().len() >= 2);
    }
}
