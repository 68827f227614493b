//! Keyword tables for each topic and for the sources that use a single
//! cross-topic vocabulary.

use super::KeywordRules;
use crate::models::Category;

struct TopicKeywords {
    slug: &'static str,
    /// Used both as the Reddit relevance gate and by the deduplicator.
    relevance: &'static [&'static str],
    level_3_keywords: &'static [&'static str],
    level_3_phrases: &'static [&'static str],
    level_2_keywords: &'static [&'static str],
    level_2_phrases: &'static [&'static str],
}

const TOPICS: &[TopicKeywords] = &[
    TopicKeywords {
        slug: "healthcare",
        relevance: &[
            "insurance", "medical", "hospital", "doctor", "treatment", "diagnosis",
            "prescription", "medication", "medicine", "healthcare", "health care",
            "denied claim", "prior authorization", "copay", "deductible", "premium",
            "surgery", "cancer", "chronic", "illness", "sick", "disease",
            "emergency room", "er visit", "ambulance", "medical bill", "medical debt",
        ],
        level_3_keywords: &[
            "bankruptcy", "collections", "medical debt", "going broke",
            "can't afford treatment", "life-saving", "cancer treatment",
            "dying", "emergency", "life or death", "denied life-saving",
            "filed for bankruptcy", "lost everything",
        ],
        level_3_phrases: &[
            "filed for bankruptcy", "going to die", "denied life-saving",
            "can't afford cancer", "medical bankruptcy",
        ],
        level_2_keywords: &[
            "denied", "claim denied", "rejected", "appeal denied",
            "won't cover", "can't afford", "prior authorization",
            "high deductible", "out of pocket", "surprise bill",
            "out of network",
        ],
        level_2_phrases: &[
            "claim denied", "appeal denied", "prior authorization",
            "can't afford", "won't cover",
        ],
    },
    TopicKeywords {
        slug: "ai_psychosis",
        relevance: &[
            "ai", "chatgpt", "replika", "character.ai", "character ai", "chatbot",
            "artificial intelligence", "gpt", "bot", "ai companion", "ai girlfriend",
            "ai boyfriend", "ai friend", "virtual", "digital companion",
        ],
        level_3_keywords: &[
            "can't stop", "addicted", "lost touch with reality",
            "replacing human", "emotional dependency", "isolated",
            "obsessed", "lost friends", "mental health",
            "parasocial", "broke down crying",
        ],
        level_3_phrases: &[
            "can't stop talking to", "replaced my therapist",
            "only friend is ai", "lost touch with reality",
        ],
        level_2_keywords: &[
            "too much time", "distracted", "obsession", "hours a day",
            "compulsive", "dependent", "prefer ai", "relationship with ai",
        ],
        level_2_phrases: &["spend hours", "can't stop using", "prefer talking to ai"],
    },
    TopicKeywords {
        slug: "subscription_overload",
        relevance: &[
            "subscription", "streaming", "netflix", "hulu", "disney", "hbo", "max",
            "spotify", "apple music", "amazon prime", "monthly fee", "annual fee",
            "cancel subscription", "too many subscriptions", "subscription fatigue",
            "streaming service", "subscribe", "membership",
        ],
        level_3_keywords: &[
            "can't afford", "cancelled everything", "going broke",
            "hundreds a month", "subscription trap", "debt",
            "overdraft", "can't keep up",
        ],
        level_3_phrases: &[
            "cancelled everything", "can't afford subscriptions",
            "hundreds a month on subscriptions",
        ],
        level_2_keywords: &[
            "too expensive", "price hike", "another increase",
            "nickel and dime", "cutting back", "cancelling",
            "not worth it", "frustrating",
        ],
        level_2_phrases: &[
            "price increase", "too many subscriptions",
            "cutting back on subscriptions",
        ],
    },
    TopicKeywords {
        slug: "wage_stagnation",
        relevance: &[
            "wage", "salary", "paycheck", "pay", "income", "hourly", "minimum wage",
            "raise", "promotion", "cost of living", "inflation", "afford",
            "paycheck to paycheck", "living paycheck", "broke", "poor", "poverty",
            "bills", "expenses", "budget", "financial", "money", "debt",
            "work", "job", "employer", "boss", "overtime", "side hustle",
        ],
        level_3_keywords: &[
            "can't afford food", "starving", "homeless", "eviction",
            "two jobs", "three jobs", "can't survive", "going hungry",
            "food bank", "behind on rent", "utilities shut off",
        ],
        level_3_phrases: &[
            "working full time and homeless", "can't afford to eat",
            "two jobs and still broke", "behind on rent",
        ],
        level_2_keywords: &[
            "paycheck to paycheck", "barely surviving", "can't save",
            "no savings", "wages stagnant", "inflation",
            "not keeping up", "struggling", "can't get ahead",
        ],
        level_2_phrases: &[
            "paycheck to paycheck", "can't afford rent",
            "wages not keeping up", "working poor",
        ],
    },
    TopicKeywords {
        slug: "housing_despair",
        relevance: &[
            "rent", "rental", "landlord", "tenant", "lease", "apartment", "house",
            "home", "housing", "mortgage", "down payment", "homeowner", "eviction",
            "evicted", "roommate", "living situation", "move out", "kicked out",
            "homeless", "van life", "couch surfing", "real estate", "property",
            "buy a home", "priced out", "afford rent", "rent increase",
        ],
        level_3_keywords: &[
            "homeless", "eviction", "living in car", "shelter",
            "priced out", "displaced", "can't afford anywhere",
            "nowhere to go", "sleeping on couch",
        ],
        level_3_phrases: &[
            "living in car", "facing eviction", "priced out of",
            "nowhere to live", "homeless",
        ],
        level_2_keywords: &[
            "can't afford", "rent increase", "housing crisis",
            "outbid", "can't buy", "saving impossible",
            "rent too high", "bidding war",
        ],
        level_2_phrases: &[
            "rent increase", "can't afford home", "housing crisis", "priced out",
        ],
    },
    TopicKeywords {
        slug: "dating_app_despair",
        relevance: &[
            "dating", "tinder", "hinge", "bumble", "match", "swipe", "online dating",
            "dating app", "relationship", "single", "ghosted", "matched", "date",
            "boyfriend", "girlfriend", "romance", "love life", "dating scene",
        ],
        level_3_keywords: &[
            "gave up", "hopeless", "never find anyone", "depressed",
            "lonely", "years of swiping", "suicidal", "unlovable",
            "completely alone", "self-worth destroyed",
        ],
        level_3_phrases: &[
            "gave up on dating", "lost all hope", "years of swiping nothing",
            "self-worth destroyed",
        ],
        level_2_keywords: &[
            "burnout", "exhausting", "frustrating", "waste of time",
            "deleted apps", "fatigue", "no matches", "ghosted",
            "toxic", "pay to play",
        ],
        level_2_phrases: &[
            "deleted dating apps", "swiping fatigue", "dating app burnout", "no matches",
        ],
    },
    TopicKeywords {
        slug: "layoff_watch",
        relevance: &[
            "layoff", "laid off", "fired", "terminated", "let go", "downsized",
            "unemployment", "unemployed", "job search", "job hunting", "resume",
            "interview", "application", "hiring", "recruiter", "job market",
            "severance", "career", "position eliminated",
        ],
        level_3_keywords: &[
            "lost everything", "can't find work", "months unemployed",
            "depression", "family suffering", "running out of savings",
            "about to be homeless", "hundreds of applications",
            "500 applications",
        ],
        level_3_phrases: &[
            "months unemployed", "hundreds of applications no response",
            "running out of savings", "500 applications",
        ],
        level_2_keywords: &[
            "laid off", "layoffs", "job search", "no callbacks",
            "ghost", "ghosted by employer", "hiring freeze",
            "restructuring", "downsizing", "severance",
        ],
        level_2_phrases: &[
            "laid off", "tech layoffs", "job search nightmare", "no response", "ghosted",
        ],
    },
    TopicKeywords {
        slug: "airline_chaos",
        relevance: &[
            "flight", "airline", "airport", "plane", "travel", "flying", "flew",
            "cancelled", "delayed", "luggage", "baggage", "passenger", "boarding",
            "gate", "terminal", "pilot", "crew", "turbulence", "layover",
            "connection", "ticket", "booking",
        ],
        level_3_keywords: &[
            "stranded for days", "missed funeral", "missed wedding",
            "lost all luggage", "no compensation", "no refund",
            "sleeping at airport", "stuck overnight", "abandoned",
            "medical emergency", "medication in luggage",
        ],
        level_3_phrases: &["stranded", "missed funeral", "missed wedding", "sleeping at airport"],
        level_2_keywords: &[
            "hours delayed", "cancelled twice", "rebooked multiple times",
            "missed connection", "lost luggage", "damaged luggage",
            "rude staff", "no help", "customer service terrible",
            "compensation denied",
        ],
        level_2_phrases: &["delayed", "cancelled", "lost luggage", "missed connection"],
    },
];

fn find_topic(slug: &str) -> Option<&'static TopicKeywords> {
    TOPICS.iter().find(|t| t.slug == slug)
}

/// Slugs that have a keyword table.
pub fn known_topics() -> impl Iterator<Item = &'static str> {
    TOPICS.iter().map(|t| t.slug)
}

/// Topic relevance vocabulary; empty for unknown topics.
pub fn relevance_keywords(slug: &str) -> &'static [&'static str] {
    find_topic(slug).map(|t| t.relevance).unwrap_or(&[])
}

/// Per-topic rules: two keyword hits or one phrase per level.
pub fn topic(slug: &str) -> Option<KeywordRules> {
    find_topic(slug).map(|t| KeywordRules {
        required: &[],
        level_3_keywords: t.level_3_keywords,
        level_3_phrases: t.level_3_phrases,
        level_3_threshold: 2,
        level_2_keywords: t.level_2_keywords,
        level_2_phrases: t.level_2_phrases,
        level_2_threshold: 2,
        level_2_label: Category::Level2Struggling,
        level_1_label: Category::Level1Aware,
        filter_clickbait: true,
    })
}

/// Topic rules that additionally require one relevance keyword, for forums
/// whose search results drift off topic.
pub fn topic_with_relevance(slug: &str) -> Option<KeywordRules> {
    topic(slug).map(|rules| KeywordRules {
        required: relevance_keywords(slug),
        level_2_label: Category::Level2Frustrated,
        ..rules
    })
}

pub const HACKER_NEWS: KeywordRules = KeywordRules {
    required: &[],
    level_3_keywords: &[
        "homeless", "bankrupt", "crisis", "emergency",
        "can't survive", "lost everything", "eviction",
        "sleeping in car", "living in car", "suicidal",
        "no food", "starving", "destitute",
    ],
    level_3_phrases: &[],
    level_3_threshold: 1,
    level_2_keywords: &[
        "struggling", "frustrated", "exhausted",
        "can't afford", "giving up", "burned out",
        "desperate", "overwhelmed", "anxiety",
        "drowning in", "breaking point", "hopeless",
    ],
    level_2_phrases: &[],
    level_2_threshold: 1,
    level_2_label: Category::Level2Frustrated,
    level_1_label: Category::Level1Aware,
    filter_clickbait: true,
};

pub const CFPB: KeywordRules = KeywordRules {
    required: &[],
    level_3_keywords: &[
        "bankruptcy", "lawsuit", "foreclosure", "denied treatment",
        "emergency", "life-threatening", "sued", "wage garnishment",
        "court order", "eviction", "homeless", "lost my home",
        "filed chapter", "repossession",
    ],
    level_3_phrases: &[],
    level_3_threshold: 1,
    level_2_keywords: &[
        "repeated", "multiple times", "denied claim", "denied claims",
        "high cost", "collections", "collection agency", "unaffordable",
        "struggling to pay", "can't afford", "overcharged", "unfair fees",
        "hidden fees", "unauthorized charge", "predatory", "harassment",
        "ruined credit", "credit score dropped", "deceptive",
    ],
    level_2_phrases: &[],
    level_2_threshold: 1,
    level_2_label: Category::Level2Frustrated,
    level_1_label: Category::Level1Aware,
    filter_clickbait: false,
};

pub const TIKTOK: KeywordRules = KeywordRules {
    required: &[],
    level_3_keywords: &[
        "destroyed", "ruined", "nightmare", "horror", "worst", "crisis",
        "cant afford", "can't afford", "homeless", "bankrupt", "died",
        "depressed", "anxiety", "panic", "trauma", "addicted", "crying",
        "broke down", "mental health", "viral", "insane", "unbelievable",
    ],
    level_3_phrases: &[],
    level_3_threshold: 1,
    level_2_keywords: &[
        "struggle", "frustrated", "angry", "unfair", "ridiculous",
        "expensive", "stress", "worried", "scared", "difficult", "hard",
        "reaction", "shocked", "wow", "crazy",
    ],
    level_2_phrases: &[],
    level_2_threshold: 1,
    level_2_label: Category::Level2Frustrated,
    level_1_label: Category::Level1Casual,
    filter_clickbait: true,
};

pub const APP_STORE: KeywordRules = KeywordRules {
    required: &[],
    level_3_keywords: &[
        "addicted", "addiction", "cant stop", "can't stop", "obsessed",
        "ruined my life", "destroyed", "mental health", "depressed",
        "lonely", "only friend", "replaced", "prefer ai", "real relationships",
    ],
    level_3_phrases: &[],
    level_3_threshold: 1,
    level_2_keywords: &[
        "attached", "emotional", "feelings", "love", "relationship",
        "companion", "talk every day", "hours", "dependent", "need",
    ],
    level_2_phrases: &[],
    level_2_threshold: 1,
    level_2_label: Category::Level2Dependent,
    level_1_label: Category::Level1Casual,
    filter_clickbait: false,
};
