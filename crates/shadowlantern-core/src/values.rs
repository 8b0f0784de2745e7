//! Value taxonomy used by the analysis prompts and card sorting.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueCategory {
    Achievement,
    Relationship,
    Autonomy,
    Security,
    Pleasure,
    Meaning,
    Power,
    Tradition,
}

impl ValueCategory {
    pub const ALL: [ValueCategory; 8] = [
        Self::Achievement,
        Self::Relationship,
        Self::Autonomy,
        Self::Security,
        Self::Pleasure,
        Self::Meaning,
        Self::Power,
        Self::Tradition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Achievement => "achievement",
            Self::Relationship => "relationship",
            Self::Autonomy => "autonomy",
            Self::Security => "security",
            Self::Pleasure => "pleasure",
            Self::Meaning => "meaning",
            Self::Power => "power",
            Self::Tradition => "tradition",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Achievement => "Achievement & Growth",
            Self::Relationship => "Relationship & Connection",
            Self::Autonomy => "Autonomy & Freedom",
            Self::Security => "Security & Stability",
            Self::Pleasure => "Pleasure & Stimulation",
            Self::Meaning => "Meaning & Purpose",
            Self::Power => "Power & Influence",
            Self::Tradition => "Tradition & Order",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueCard {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ValueCategory,
    pub description: &'static str,
}

const fn card(
    id: &'static str,
    name: &'static str,
    category: ValueCategory,
    description: &'static str,
) -> ValueCard {
    ValueCard {
        id,
        name,
        category,
        description,
    }
}

use ValueCategory::*;

pub const VALUE_CARDS: [ValueCard; 88] = [
    card("V001", "Achievement", Achievement, "Reaching goals and succeeding"),
    card("V002", "Competence", Achievement, "Having strong abilities and using them"),
    card("V003", "Growth", Achievement, "Always learning and growing"),
    card("V004", "Knowledge", Achievement, "Deepening knowledge and understanding"),
    card("V005", "Challenge", Achievement, "Taking on hard things and passing limits"),
    card("V006", "Diligence", Achievement, "Working earnestly without sparing effort"),
    card("V007", "Mastery", Achievement, "Perfecting a skill and becoming an expert"),
    card("V008", "Accuracy", Achievement, "Doing precise, exact work"),
    card("V009", "Efficiency", Achievement, "Getting things done without waste"),
    card("V010", "Creativity", Achievement, "Producing new ideas"),
    card("V011", "Curiosity", Achievement, "Exploring what is new"),
    card("V012", "Love", Relationship, "Loving and being loved"),
    card("V013", "Family", Relationship, "Cherishing family bonds"),
    card("V014", "Friendship", Relationship, "Nurturing friendships"),
    card("V015", "Belonging", Relationship, "Being part of a community"),
    card("V016", "Contribution", Relationship, "Contributing to others and society"),
    card("V017", "Cooperation", Relationship, "Achieving things together"),
    card("V018", "Compassion", Relationship, "Caring for others"),
    card("V019", "Tolerance", Relationship, "Accepting differences"),
    card("V020", "Loyalty", Relationship, "Keeping faith with others"),
    card("V021", "Intimacy", Relationship, "Having deep connections"),
    card("V022", "Nurturing", Relationship, "Raising and protecting others"),
    card("V023", "Freedom", Autonomy, "Living unbound"),
    card("V024", "Independence", Autonomy, "Living on your own strength"),
    card("V025", "Self-determination", Autonomy, "Making your own choices"),
    card("V026", "Individuality", Autonomy, "Valuing what makes you you"),
    card("V027", "Genuineness", Autonomy, "Being your real self"),
    card("V028", "Flexibility", Autonomy, "Adapting to change"),
    card("V029", "Privacy", Autonomy, "Guarding your own space"),
    card("V030", "Mindfulness", Autonomy, "Attending to the present moment"),
    card("V031", "Inner peace", Autonomy, "Keeping a calm mind"),
    card("V032", "Safety", Security, "Being protected from danger"),
    card("V033", "Stability", Security, "A steady life with little upheaval"),
    card("V034", "Health", Security, "Being well in body and mind"),
    card("V035", "Financial security", Security, "Being financially secure"),
    card("V036", "Order", Security, "A tidy, organized environment"),
    card("V037", "Responsibility", Security, "Meeting your responsibilities"),
    card("V038", "Reliability", Security, "Being someone others can trust"),
    card("V039", "Self-discipline", Security, "Governing yourself"),
    card("V040", "Moderation", Security, "Keeping to a sensible measure"),
    card("V041", "Pleasure", Pleasure, "Feeling joy and enjoyment"),
    card("V042", "Adventure", Pleasure, "Seeking new experiences"),
    card("V043", "Excitement", Pleasure, "Having thrilling experiences"),
    card("V044", "Beauty", Pleasure, "Appreciating beautiful things"),
    card("V045", "Humor", Pleasure, "Valuing laughter and fun"),
    card("V046", "Play", Pleasure, "Keeping a playful spirit"),
    card("V047", "Comfort", Pleasure, "Living in comfort"),
    card("V048", "Leisure", Pleasure, "Enjoying free time"),
    card("V049", "Variety", Pleasure, "Having diverse experiences"),
    card("V050", "Sensitivity", Pleasure, "Valuing your sensibility"),
    card("V051", "Meaning", Meaning, "Finding meaning in life"),
    card("V052", "Purpose", Meaning, "Living with a clear purpose"),
    card("V053", "Mission", Meaning, "Fulfilling your calling"),
    card("V054", "Hope", Meaning, "Holding hope for the future"),
    card("V055", "Faith", Meaning, "Holding spiritual convictions"),
    card("V056", "Gratitude", Meaning, "Feeling thankful"),
    card("V057", "Service", Meaning, "Devoting yourself to others"),
    card("V058", "Worldview", Meaning, "Having your own view of the world"),
    card("V059", "Legacy", Meaning, "Creating something that lasts"),
    card("V060", "Environment", Meaning, "Protecting the natural world"),
    card("V061", "Influence", Power, "Affecting others and society"),
    card("V062", "Leadership", Power, "Leading people"),
    card("V063", "Authority", Power, "Holding power or position"),
    card("V064", "Fame", Power, "Gaining renown and reputation"),
    card("V065", "Wealth", Power, "Being materially rich"),
    card("V066", "Control", Power, "Being in control"),
    card("V067", "Recognition", Power, "Being acknowledged by others"),
    card("V068", "Competition", Power, "Winning against others"),
    card("V069", "Victory", Power, "Achieving victory"),
    card("V070", "Assertiveness", Power, "Speaking your mind"),
    card("V071", "Tradition", Tradition, "Honoring customs and tradition"),
    card("V072", "Discipline", Tradition, "Following the rules"),
    card("V073", "Justice", Tradition, "Pursuing what is right"),
    card("V074", "Integrity", Tradition, "Being sincere and honest"),
    card("V075", "Humility", Tradition, "Being humble"),
    card("V076", "Courtesy", Tradition, "Being polite"),
    card("V077", "Harmony", Tradition, "Keeping harmony"),
    card("V078", "Obedience", Tradition, "Deferring to authority"),
    card("V079", "Patriotism", Tradition, "Loving your country or region"),
    card("V080", "Culture", Tradition, "Preserving and passing on culture"),
    card("V081", "Authenticity", Autonomy, "Being yourself without pretense"),
    card("V082", "Courage", Achievement, "Acting in spite of fear"),
    card("V083", "Vulnerability", Relationship, "Daring to show weakness"),
    card("V084", "Empathy", Relationship, "Understanding others' feelings"),
    card("V085", "Boundaries", Security, "Setting healthy boundaries"),
    card("V086", "Wholeheartedness", Autonomy, "Fully accepting yourself"),
    card("V087", "Shame resilience", Meaning, "Having the strength to move past shame"),
    card("V088", "True belonging", Relationship, "Having a real place to belong"),
];

/// Look a card up by id (`V001`) or by case-insensitive name.
pub fn find_value(key: &str) -> Option<&'static ValueCard> {
    VALUE_CARDS
        .iter()
        .find(|c| c.id == key || c.name.eq_ignore_ascii_case(key))
}

/// All cards in random order, for card sorting.
pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static ValueCard> {
    let mut cards: Vec<_> = VALUE_CARDS.iter().collect();
    cards.shuffle(rng);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_sequential() {
        let ids: HashSet<_> = VALUE_CARDS.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 88);
        assert_eq!(VALUE_CARDS[0].id, "V001");
        assert_eq!(VALUE_CARDS[87].id, "V088");
    }

    #[test]
    fn every_category_is_populated() {
        for category in ValueCategory::ALL {
            let count = VALUE_CARDS.iter().filter(|c| c.category == category).count();
            assert!(count >= 10, "{}", category.as_str());
        }
    }

    #[test]
    fn lookup_by_id_or_name() {
        assert_eq!(find_value("V023").unwrap().name, "Freedom");
        assert_eq!(find_value("freedom").unwrap().id, "V023");
        assert!(find_value("V999").is_none());
    }

    #[test]
    fn shuffle_keeps_every_card() {
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        let cards = shuffled(&mut rng);
        assert_eq!(cards.len(), 88);
        let ids: HashSet<_> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 88);
    }
}
