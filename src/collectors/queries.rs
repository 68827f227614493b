//! Search terms per topic and source.

pub struct TopicQueries {
    pub slug: &'static str,
    pub youtube: &'static [&'static str],
    /// YouTube searches for TikTok compilations.
    pub tiktok: &'static [&'static str],
    pub bluesky: &'static [&'static str],
    /// Empty when Hacker News has nothing useful on the topic.
    pub hackernews: &'static [&'static str],
    pub subreddits: &'static [&'static str],
    pub reddit: &'static [&'static str],
}

pub const TOPIC_QUERIES: &[TopicQueries] = &[
    TopicQueries {
        slug: "healthcare",
        youtube: &[
            "insurance denied my claim",
            "can't afford healthcare",
            "medical bankruptcy",
            "prior authorization nightmare",
            "health insurance horror story",
            "hospital bill nightmare",
        ],
        tiktok: &[
            "tiktok compilation insurance denied",
            "tiktok healthcare nightmare",
            "tiktok medical bill shock",
            "viral tiktok hospital bill",
        ],
        bluesky: &["medical debt", "insurance denied", "healthcare nightmare", "hospital bill"],
        hackernews: &[],
        subreddits: &["HealthInsurance", "povertyfinance", "ChronicIllness"],
        reddit: &["claim denied", "medical debt", "prior authorization", "surprise bill"],
    },
    TopicQueries {
        slug: "ai_psychosis",
        youtube: &[
            "my AI girlfriend",
            "addicted to Character.AI",
            "Replika breakup",
            "in love with AI",
            "AI companion mental health",
        ],
        tiktok: &[
            "tiktok replika ai",
            "tiktok character ai addiction",
            "tiktok ai boyfriend girlfriend",
            "tiktok fell in love with ai",
        ],
        bluesky: &["AI addiction", "ChatGPT obsession", "AI companion", "Character AI"],
        hackernews: &["AI addiction", "ChatGPT obsession", "AI companion", "Character.AI"],
        subreddits: &["CharacterAI", "replika"],
        reddit: &["addicted", "can't stop", "relationship", "lonely"],
    },
    TopicQueries {
        slug: "subscription_overload",
        youtube: &[
            "subscription fatigue",
            "too many subscriptions",
            "streaming service overload",
            "can't afford subscriptions",
            "subscription trap",
        ],
        tiktok: &[
            "tiktok cancel subscriptions",
            "tiktok too many streaming services",
            "tiktok streaming fatigue",
        ],
        bluesky: &["subscription fatigue", "streaming costs", "too many subscriptions", "price increase"],
        hackernews: &["subscription fatigue", "price increase", "streaming costs", "SaaS pricing"],
        subreddits: &["personalfinance", "cordcutters", "Frugal"],
        reddit: &["too many subscriptions", "cancel subscription", "price increase"],
    },
    TopicQueries {
        slug: "wage_stagnation",
        youtube: &[
            "living paycheck to paycheck",
            "can't afford rent on my salary",
            "working full time still poor",
            "two jobs still struggling",
            "cost of living crisis",
        ],
        tiktok: &[
            "tiktok paycheck to paycheck",
            "viral tiktok minimum wage",
            "tiktok working poor",
            "tiktok cost of living",
        ],
        bluesky: &["paycheck to paycheck", "wages not keeping up", "can't afford rent salary", "working poor"],
        hackernews: &["paycheck to paycheck", "can't afford rent", "wages not keeping up", "cost of living"],
        subreddits: &["povertyfinance", "antiwork", "WorkReform", "lostgeneration"],
        reddit: &["paycheck to paycheck", "wages too low", "broke despite working", "working poor"],
    },
    TopicQueries {
        slug: "housing_despair",
        youtube: &[
            "can't afford a house",
            "priced out of my city",
            "rent increase nightmare",
            "evicted",
            "housing crisis",
        ],
        tiktok: &[
            "tiktok housing crisis",
            "tiktok cant afford rent",
            "tiktok priced out",
            "tiktok rent too high",
        ],
        bluesky: &["housing crisis", "can't afford home", "rent increase", "priced out housing"],
        hackernews: &["housing crisis", "can't afford home", "rent too high", "priced out"],
        subreddits: &["FirstTimeHomeBuyer", "renters", "HousingCrisis", "povertyfinance"],
        reddit: &["can't afford house", "priced out", "rent increase", "eviction", "landlord"],
    },
    TopicQueries {
        slug: "airline_chaos",
        youtube: &[
            "flight cancelled stranded",
            "lost luggage horror story",
            "stuck on tarmac",
            "airline refused refund",
            "worst airline experience",
        ],
        tiktok: &[
            "tiktok flight cancelled",
            "tiktok airline nightmare",
            "viral tiktok lost luggage",
            "tiktok flight delayed",
        ],
        bluesky: &["flight cancelled", "stranded airport", "airline nightmare", "flight delayed"],
        hackernews: &[],
        subreddits: &["travel", "delta", "united", "mildlyinfuriating"],
        reddit: &["flight cancelled", "stranded", "lost luggage", "airline won't refund"],
    },
    TopicQueries {
        slug: "dating_app_despair",
        youtube: &[
            "I quit dating apps",
            "dating app burnout",
            "dating app horror stories",
            "giving up on dating apps",
            "dating app fatigue",
        ],
        tiktok: &[
            "tiktok dating apps",
            "tiktok dating is hard",
            "tiktok ghosted",
            "tiktok dating app fatigue",
        ],
        bluesky: &["dating app burnout", "swiping fatigue", "deleted dating apps", "dating app despair"],
        hackernews: &[],
        subreddits: &["dating", "Tinder", "Bumble", "OnlineDating"],
        reddit: &["quit dating apps", "burnout", "giving up", "horror story"],
    },
    TopicQueries {
        slug: "layoff_watch",
        youtube: &[
            "laid off can't find job",
            "applied to 500 jobs",
            "job search depression",
            "layoff anxiety",
            "mass layoffs",
        ],
        tiktok: &[
            "tiktok laid off",
            "tiktok tech layoffs",
            "tiktok job search nightmare",
            "tiktok layoff day",
        ],
        bluesky: &["laid off", "tech layoffs 2025", "job search nightmare", "500 applications no response"],
        hackernews: &["laid off", "tech layoffs", "job search nightmare", "500 applications", "layoff wave"],
        subreddits: &["jobs", "cscareerquestions", "layoffs", "unemployed"],
        reddit: &["laid off", "can't find job", "applied to hundreds", "no interviews"],
    },
];

pub fn for_topic(slug: &str) -> Option<&'static TopicQueries> {
    TOPIC_QUERIES.iter().find(|q| q.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::presets;

    #[test]
    fn test_every_topic_has_queries_and_keywords() {
        for q in TOPIC_QUERIES {
            assert!(!q.youtube.is_empty(), "{}", q.slug);
            assert!(!q.tiktok.is_empty(), "{}", q.slug);
            assert!(!q.bluesky.is_empty(), "{}", q.slug);
            assert!(!q.subreddits.is_empty(), "{}", q.slug);
            assert!(presets::topic(q.slug).is_some(), "{}", q.slug);
        }
        assert_eq!(TOPIC_QUERIES.len(), presets::known_topics().count());
    }

    #[test]
    fn test_for_topic() {
        assert!(for_topic("layoff_watch").unwrap().hackernews.contains(&"laid off"));
        assert!(for_topic("airline_chaos").unwrap().hackernews.is_empty());
        assert!(for_topic("nope").is_none());
    }
}
