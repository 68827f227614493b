//! Keyword severity categorization shared by every collector.
//!
//! A [`KeywordRules`] value describes one vocabulary: level-3 and level-2
//! keyword lists with a hit threshold, "critical phrases" that promote on a
//! single match, and the label variants the source writes. Matching is
//! case-insensitive substring containment.
//!
//! Presets live in [`presets`]; the content filter lives in [`filters`].

pub mod filters;
pub mod presets;

use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordRules {
    /// When non-empty, text must contain at least one of these to be kept.
    pub required: &'static [&'static str],
    pub level_3_keywords: &'static [&'static str],
    pub level_3_phrases: &'static [&'static str],
    pub level_3_threshold: usize,
    pub level_2_keywords: &'static [&'static str],
    pub level_2_phrases: &'static [&'static str],
    pub level_2_threshold: usize,
    pub level_2_label: Category,
    pub level_1_label: Category,
    /// Drop clickbait and promotional text before labelling.
    pub filter_clickbait: bool,
}

fn count_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(*kw)).count()
}

fn any_hit(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

impl KeywordRules {
    /// Label `text`, or `None` when the text is filtered out.
    pub fn categorize(&self, text: &str) -> Option<Category> {
        let text = text.to_lowercase();

        if self.filter_clickbait && !filters::filter_content(&text, "", "") {
            return None;
        }
        if !self.required.is_empty() && !any_hit(&text, self.required) {
            return None;
        }

        let level_3 = count_hits(&text, self.level_3_keywords);
        if level_3 >= self.level_3_threshold || any_hit(&text, self.level_3_phrases) {
            return Some(Category::Level3Crisis);
        }

        let level_2 = count_hits(&text, self.level_2_keywords);
        if level_2 >= self.level_2_threshold || any_hit(&text, self.level_2_phrases) {
            return Some(self.level_2_label);
        }

        Some(self.level_1_label)
    }

    /// Label a title/body pair.
    pub fn categorize_parts(&self, title: &str, body: &str) -> Option<Category> {
        self.categorize(&format!("{title} {body}"))
    }

    /// Keywords found in `text`, level 3 first, capped at `limit`.
    pub fn matched_keywords(&self, text: &str, limit: usize) -> Vec<&'static str> {
        let text = text.to_lowercase();
        self.level_3_keywords
            .iter()
            .chain(self.level_2_keywords)
            .filter(|kw| text.contains(*kw))
            .take(limit)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn housing() -> KeywordRules {
        presets::topic("housing_despair").unwrap()
    }

    #[test]
    fn test_single_phrase_promotes_to_level_3() {
        assert_eq!(
            housing().categorize("We are now Living In Car with two kids"),
            Some(Category::Level3Crisis)
        );
    }

    #[test]
    fn test_two_keywords_reach_threshold() {
        // "shelter" and "displaced" are keywords, neither is a phrase.
        assert_eq!(
            housing().categorize("displaced and looking for a shelter"),
            Some(Category::Level3Crisis)
        );
    }

    #[test]
    fn test_one_keyword_below_threshold_falls_through() {
        // One level-3 keyword ("shelter") is not enough; "outbid" + "bidding war" are level 2.
        assert_eq!(
            housing().categorize("outbid in a bidding war, thinking about a shelter dog"),
            Some(Category::Level2Struggling)
        );
    }

    #[test]
    fn test_default_is_level_1_label() {
        assert_eq!(
            housing().categorize("Thinking about moving next year"),
            Some(Category::Level1Aware)
        );
        assert_eq!(
            presets::TIKTOK.categorize("cute dog video"),
            Some(Category::Level1Casual)
        );
    }

    #[test]
    fn test_threshold_one_presets() {
        assert_eq!(
            presets::HACKER_NEWS.categorize("Ask HN: Burned out after layoffs"),
            Some(Category::Level2Frustrated)
        );
        assert_eq!(
            presets::CFPB.categorize("Mortgage servicer started foreclosure"),
            Some(Category::Level3Crisis)
        );
        assert_eq!(
            presets::APP_STORE.categorize("I talk to her for hours"),
            Some(Category::Level2Dependent)
        );
    }

    #[test]
    fn test_clickbait_is_filtered() {
        assert_eq!(housing().categorize("This one trick got me out of eviction"), None);
        // CFPB narratives are never clickbait-filtered.
        assert!(presets::CFPB.categorize("how i paid off my debt").is_some());
    }

    #[test]
    fn test_required_keywords_gate() {
        let rules = presets::topic_with_relevance("housing_despair").unwrap();
        assert_eq!(rules.categorize("My cat is hopeless at fetch"), None);
        assert_eq!(
            rules.categorize_parts("Landlord raised rent", "rent increase of 30%"),
            Some(Category::Level2Frustrated)
        );
    }

    #[test]
    fn test_matched_keywords_orders_level_3_first() {
        let found = housing().matched_keywords("Rent increase then eviction, now homeless", 5);
        assert_eq!(found, vec!["homeless", "eviction", "rent increase"]);
        assert_eq!(housing().matched_keywords("homeless eviction", 1).len(), 1);
    }
}
