//! Static frequency catalog
//!
//! The catalog is compiled in. Tracks are materialized once on first use and
//! handed out as clones; lookups are linear, which is fine at this size.

use crate::models::{Track, TrackId};
use std::sync::OnceLock;

struct EntryDef {
    id: u32,
    name: &'static str,
    frequency_hz: f64,
    description: &'static str,
    duration_minutes: u32,
    icon: &'static str,
}

const fn entry(
    id: u32,
    name: &'static str,
    frequency_hz: f64,
    description: &'static str,
    duration_minutes: u32,
    icon: &'static str,
) -> EntryDef {
    EntryDef {
        id,
        name,
        frequency_hz,
        description,
        duration_minutes,
        icon,
    }
}

struct CategoryDef {
    name: &'static str,
    entries: &'static [EntryDef],
}

impl EntryDef {
    fn to_track(&self, category: &str, is_recommended: bool) -> Track {
        Track {
            id: TrackId(self.id),
            name: self.name.to_string(),
            frequency_hz: self.frequency_hz,
            description: self.description.to_string(),
            duration_minutes: self.duration_minutes,
            category: category.to_string(),
            icon: self.icon.to_string(),
            is_recommended,
        }
    }
}

const CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "Chill Vibes Only",
        entries: &[
            entry(1, "Serenity Wave", 432.0, "Universal harmony and relaxation", 30, "🌸"),
            entry(2, "Zen Garden", 528.0, "Love frequency for DNA repair", 25, "🌿"),
            entry(3, "Peaceful Mind", 396.0, "Liberation from fear and guilt", 20, "🧘‍♂️"),
            entry(4, "Ocean Depths", 110.0, "Deep relaxation and grounding", 35, "🌊"),
            entry(5, "Mountain Breeze", 256.0, "Natural balance and calm", 40, "🏔️"),
        ],
    },
    CategoryDef {
        name: "Hindu Gods & Mantras",
        entries: &[
            entry(91, "Hare Krishna Mantra", 741.0, "Love, devotion and divine play", 40, "🪈"),
            entry(88, "Om Namah Shivaya", 136.1, "Transformation and destruction of evil", 30, "🔱"),
            entry(93, "Hanuman Chalisa", 963.0, "Strength, courage and devotion", 30, "🐒"),
            entry(87, "Ganesha Mantra", 426.7, "Remover of obstacles and new beginnings", 25, "🐘"),
            entry(89, "Om Namo Narayanaya", 528.0, "Preservation and protection", 35, "🪷"),
            entry(90, "Lakshmi Mantra", 639.0, "Wealth, prosperity and abundance", 20, "💰"),
            entry(92, "Saraswati Vandana", 852.0, "Knowledge, wisdom and arts", 25, "📚"),
            entry(94, "Durga Mantra", 432.0, "Divine feminine power and protection", 35, "⚔️"),
            entry(95, "Ram Mantra", 396.0, "Righteousness and virtue", 45, "🏹"),
            entry(96, "Gayatri Mantra", 110.0, "Universal prayer for enlightenment", 50, "☀️"),
        ],
    },
    CategoryDef {
        name: "Sacred Tasks",
        entries: &[
            entry(97, "Meditation Focus", 136.1, "Deep meditation and inner peace", 30, "🧘‍♂️"),
            entry(98, "Chanting Rhythm", 256.0, "Rhythmic chanting harmony", 25, "🎵"),
            entry(99, "Gayatri Mantra Power", 417.0, "Sacred Gayatri vibration", 45, "☀️"),
            entry(100, "Prayer Contemplation", 741.0, "Deep prayer and devotion", 35, "🙏"),
            entry(101, "Spiritual Study", 852.0, "Enhanced scriptural learning", 40, "📖"),
            entry(102, "Sacred Silence", 7.83, "Profound inner stillness", 50, "🤫"),
            entry(103, "Devotional Practice", 528.0, "Heart-centered devotion", 30, "💝"),
            entry(104, "Spiritual Awakening", 963.0, "Consciousness expansion", 35, "✨"),
        ],
    },
    CategoryDef {
        name: "Deep Sleep Ops",
        entries: &[
            entry(6, "Dreamland Express", 40.0, "Delta waves for deep sleep", 60, "🌙"),
            entry(7, "Night Owl Cure", 174.0, "Natural anesthetic for rest", 45, "🦉"),
            entry(8, "Sleep Potion", 285.0, "Tissue healing during sleep", 50, "✨"),
            entry(9, "Midnight Melody", 110.0, "Low frequency relaxation", 90, "🎵"),
            entry(10, "Pillow Talk", 528.0, "Cellular repair during rest", 30, "💤"),
        ],
    },
    CategoryDef {
        name: "Zen Mode Activated",
        entries: &[
            entry(11, "Buddha's Frequency", 963.0, "Crown chakra activation", 30, "🧘"),
            entry(12, "Meditation Master", 852.0, "Third eye awakening", 25, "👁️"),
            entry(13, "Inner Peace", 741.0, "Expression and solutions", 20, "☮️"),
            entry(14, "Mindful Moment", 639.0, "Heart chakra harmony", 35, "💚"),
            entry(15, "Sacred Sound", 417.0, "Transformation and change", 40, "🕉️"),
        ],
    },
    CategoryDef {
        name: "Fix Me Up Doc",
        entries: &[
            entry(16, "Pain Zapper", 174.0, "Natural pain relief", 20, "⚡"),
            entry(17, "Healing Beam", 528.0, "DNA repair and healing", 30, "🔬"),
            entry(18, "Recovery Mode", 285.0, "Tissue regeneration", 25, "🩹"),
            entry(19, "Inflammation Fighter", 40.0, "Reduce inflammation", 35, "🛡️"),
            entry(20, "Cellular Repair", 741.0, "Cell detoxification", 40, "🧬"),
            entry(21, "Immune Boost", 852.0, "Strengthen immune system", 30, "💪"),
        ],
    },
    CategoryDef {
        name: "Brain Gym",
        entries: &[
            entry(22, "Focus Beam", 40.0, "Gamma waves for concentration", 25, "🎯"),
            entry(23, "Memory Boost", 432.0, "Enhanced memory retention", 30, "🧠"),
            entry(24, "Study Buddy", 8.0, "Alpha waves for learning", 45, "📚"),
            entry(25, "Mental Clarity", 10.0, "Alpha state awareness", 20, "💡"),
            entry(26, "IQ Amplifier", 963.0, "Higher consciousness", 35, "🚀"),
        ],
    },
    CategoryDef {
        name: "Third Eye Opened",
        entries: &[
            entry(27, "Cosmic Connection", 963.0, "Pineal gland activation", 30, "🌌"),
            entry(28, "Psychic Awakening", 852.0, "Intuition enhancement", 25, "🔮"),
            entry(29, "Astral Projection", 6.0, "Theta waves for OBE", 60, "👻"),
            entry(30, "Spirit Guide", 417.0, "Spiritual transformation", 40, "👼"),
            entry(31, "Chakra Alignment", 741.0, "Energy center balance", 35, "🌈"),
        ],
    },
    CategoryDef {
        name: "Cool Down Center",
        entries: &[
            entry(32, "Chill Pill", 528.0, "Instant stress relief", 15, "❄️"),
            entry(33, "Anxiety Away", 396.0, "Fear and anxiety release", 20, "🌪️"),
            entry(34, "Pressure Release", 174.0, "Tension dissolution", 25, "💨"),
            entry(35, "Calm Seas", 256.0, "Emotional balance", 30, "🌊"),
            entry(36, "Serenity Now", 639.0, "Heart rate normalization", 20, "🕊️"),
        ],
    },
    CategoryDef {
        name: "Vibe Boost Station",
        entries: &[
            entry(37, "Energy Espresso", 40.0, "Gamma burst for alertness", 10, "☕"),
            entry(38, "Motivation Machine", 528.0, "Cellular energy boost", 15, "🔋"),
            entry(39, "Power Up", 741.0, "Expression and confidence", 20, "⚡"),
            entry(40, "Vitality Vibes", 852.0, "Life force activation", 25, "✨"),
            entry(41, "Go Getter", 963.0, "Higher purpose alignment", 30, "🚀"),
        ],
    },
    CategoryDef {
        name: "Mood Mechanics",
        entries: &[
            entry(42, "Happy Pills", 528.0, "Serotonin boost frequency", 20, "😊"),
            entry(43, "Depression Buster", 396.0, "Emotional healing", 30, "🌅"),
            entry(44, "Mood Lifter", 417.0, "Positive transformation", 25, "🎈"),
            entry(45, "Joy Generator", 639.0, "Heart opening frequency", 35, "💖"),
            entry(46, "Bliss Mode", 963.0, "Transcendent happiness", 40, "🌈"),
        ],
    },
    CategoryDef {
        name: "Mindfulness Mastery",
        entries: &[
            entry(61, "Present Moment", 10.0, "Alpha state for mindfulness", 20, "🧘‍♀️"),
            entry(62, "Breath Awareness", 256.0, "Rhythmic breathing focus", 15, "💨"),
            entry(63, "Body Scan", 8.0, "Progressive relaxation", 30, "🫰"),
            entry(64, "Loving Kindness", 639.0, "Heart-centered meditation", 25, "💝"),
            entry(65, "Walking Meditation", 4.0, "Mindful movement", 35, "🚶‍♂️"),
        ],
    },
    CategoryDef {
        name: "Chakra Harmonics",
        entries: &[
            entry(66, "Root Chakra (Muladhara)", 194.18, "Grounding and stability", 20, "🔴"),
            entry(67, "Sacral Chakra (Svadhisthana)", 210.42, "Creativity and sexuality", 20, "🟠"),
            entry(68, "Solar Plexus (Manipura)", 126.22, "Personal power", 20, "🟡"),
            entry(69, "Heart Chakra (Anahata)", 341.3, "Love and compassion", 20, "🟢"),
            entry(70, "Throat Chakra (Vishuddha)", 141.27, "Communication and truth", 20, "🔵"),
            entry(71, "Third Eye (Ajna)", 221.23, "Intuition and insight", 20, "🟣"),
            entry(72, "Crown Chakra (Sahasrara)", 172.06, "Spiritual connection", 20, "⚪"),
        ],
    },
    CategoryDef {
        name: "Ancient Wisdom",
        entries: &[
            entry(73, "Tibetan Singing Bowl", 432.0, "Traditional healing sound", 30, "🎵"),
            entry(74, "Om Mantra", 136.1, "Universal sound vibration", 25, "🕉️"),
            entry(75, "Gregorian Chant", 528.0, "Sacred healing frequency", 35, "⛪"),
            entry(76, "Hindu Temple Bell", 426.7, "Spiritual awakening tone", 15, "🔔"),
            entry(77, "Native Drum Beat", 4.5, "Shamanic journey rhythm", 40, "🥁"),
        ],
    },
    CategoryDef {
        name: "Breathwork Bliss",
        entries: &[
            entry(78, "Pranayama Flow", 7.83, "Earth resonance breathing", 20, "🌍"),
            entry(79, "Wim Hof Method", 40.0, "Cold exposure breathing", 15, "🧊"),
            entry(80, "Box Breathing", 10.0, "4-4-4-4 breath pattern", 12, "📦"),
            entry(81, "Holotropic Breath", 6.0, "Consciousness expansion", 45, "🌀"),
            entry(82, "Ujjayi Breath", 256.0, "Victorious breath technique", 25, "🌊"),
        ],
    },
    CategoryDef {
        name: "Alien Frequencies",
        entries: &[
            entry(47, "UFO Landing", 111.0, "Extraterrestrial contact", 30, "🛸"),
            entry(48, "Galactic Communication", 222.0, "Cosmic messaging", 25, "👽"),
            entry(49, "Space Oddity", 333.0, "Interdimensional travel", 45, "🌌"),
            entry(50, "Martian Melody", 444.0, "Red planet resonance", 35, "🔴"),
            entry(51, "Starseed Activation", 555.0, "Cosmic DNA awakening", 60, "⭐"),
        ],
    },
    CategoryDef {
        name: "Headache Be Gone",
        entries: &[
            entry(52, "Migraine Melter", 100.0, "Vascular headache relief", 20, "🧊"),
            entry(53, "Tension Tamer", 174.0, "Muscle tension release", 15, "💆‍♂️"),
            entry(54, "Sinus Soother", 285.0, "Sinus pressure relief", 25, "🌬️"),
            entry(55, "Stress Headache Stopper", 396.0, "Stress-related pain relief", 30, "🛑"),
        ],
    },
    CategoryDef {
        name: "Power-Up Mode",
        entries: &[
            entry(56, "Workout Warrior", 40.0, "Athletic performance boost", 15, "💪"),
            entry(57, "Stamina Station", 528.0, "Endurance enhancement", 30, "🏃‍♂️"),
            entry(58, "Strength Surge", 741.0, "Physical power increase", 20, "🏋️‍♂️"),
            entry(59, "Recovery Rapid", 285.0, "Fast muscle recovery", 25, "🔄"),
            entry(60, "Champion Frequency", 963.0, "Peak performance state", 35, "🏆"),
        ],
    },
];

/// Popular set used to seed an empty favorites collection, with the category
/// each belongs to.
const POPULAR: &[(EntryDef, &str)] = &[
    (
        entry(174, "Pain Relief Pro", 174.0, "Natural anesthetic", 20, "⚡"),
        "Fix Me Up Doc",
    ),
    (
        entry(963, "Cosmic Crown", 963.0, "Crown chakra activation", 30, "👑"),
        "Third Eye Opened",
    ),
    (
        entry(396, "Fear Fighter", 396.0, "Liberation from fear", 25, "🛡️"),
        "Chill Vibes Only",
    ),
    (
        entry(528, "Love Frequency", 528.0, "DNA repair miracle tone", 30, "💚"),
        "Chill Vibes Only",
    ),
];

const MOTION_SICKNESS: EntryDef = entry(
    999,
    "Motion Sickness Relief",
    100.0,
    "Vestibular system balance",
    15,
    "🤢",
);
const MOTION_SICKNESS_CATEGORY: &str = "Fix Me Up Doc";

fn catalog_tracks() -> &'static [Track] {
    static TRACKS: OnceLock<Vec<Track>> = OnceLock::new();
    TRACKS.get_or_init(|| {
        CATEGORIES
            .iter()
            .flat_map(|category| {
                category
                    .entries
                    .iter()
                    .map(move |entry| entry.to_track(category.name, false))
            })
            .collect()
    })
}

/// Every categorized track, in category order.
pub fn all_tracks() -> &'static [Track] {
    catalog_tracks()
}

/// Number of categorized tracks.
pub fn catalog_size() -> usize {
    catalog_tracks().len()
}

/// Looks a track up by id.
///
/// Categorized tracks are searched first, then the motion sickness track and
/// the popular set, whose ids live outside the category ranges.
pub fn track_by_id(id: TrackId) -> Option<Track> {
    catalog_tracks()
        .iter()
        .find(|track| track.id == id)
        .cloned()
        .or_else(|| (MOTION_SICKNESS.id == id.0).then(motion_sickness_track))
        .or_else(|| popular_tracks().into_iter().find(|track| track.id == id))
}

/// Category names in display order.
pub fn categories() -> Vec<&'static str> {
    CATEGORIES.iter().map(|category| category.name).collect()
}

/// Tracks of one category, or `None` for an unknown name.
pub fn category(name: &str) -> Option<Vec<Track>> {
    CATEGORIES
        .iter()
        .find(|category| category.name == name)
        .map(|category| {
            category
                .entries
                .iter()
                .map(|entry| entry.to_track(category.name, false))
                .collect()
        })
}

/// The popular set, flagged `is_recommended`.
pub fn popular_tracks() -> Vec<Track> {
    POPULAR
        .iter()
        .map(|(entry, category)| entry.to_track(category, true))
        .collect()
}

pub fn motion_sickness_track() -> Track {
    MOTION_SICKNESS.to_track(MOTION_SICKNESS_CATEGORY, false)
}

/// Case-insensitive search over name, description, and category, plus a
/// substring match of the query against the printed frequency.
///
/// An empty query matches everything.
pub fn search(query: &str) -> Vec<Track> {
    let needle = query.to_lowercase();
    catalog_tracks()
        .iter()
        .filter(|track| {
            track.name.to_lowercase().contains(&needle)
                || track.description.to_lowercase().contains(&needle)
                || track.frequency_hz.to_string().contains(query)
                || track.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<_> = all_tracks().iter().map(|track| track.id).collect();
        assert_eq!(ids.len(), catalog_size());
        assert_eq!(catalog_size(), 100);
    }

    #[test]
    fn test_every_track_has_category() {
        assert!(all_tracks().iter().all(|track| !track.category.is_empty()));
        assert_eq!(categories().len(), 18);
        assert_eq!(categories()[0], "Chill Vibes Only");
    }

    #[test]
    fn test_track_by_id() {
        let track = track_by_id(TrackId(7)).unwrap();
        assert_eq!(track.name, "Night Owl Cure");
        assert_eq!(track.frequency_hz, 174.0);
        assert_eq!(track.category, "Deep Sleep Ops");

        assert_eq!(track_by_id(TrackId(999)).unwrap().name, "Motion Sickness Relief");
        assert!(track_by_id(TrackId(174)).unwrap().is_recommended);
        assert!(track_by_id(TrackId(12345)).is_none());
    }

    #[test]
    fn test_category_lookup() {
        let chakras = category("Chakra Harmonics").unwrap();
        assert_eq!(chakras.len(), 7);
        assert_eq!(chakras[0].frequency_hz, 194.18);
        assert!(category("Nope").is_none());
    }

    #[test]
    fn test_popular_tracks_are_recommended() {
        let popular = popular_tracks();
        let ids: Vec<u32> = popular.iter().map(|track| track.id.0).collect();
        assert_eq!(ids, vec![174, 963, 396, 528]);
        assert!(popular.iter().all(|track| track.is_recommended));
    }

    #[test]
    fn test_search_matches_text_case_insensitively() {
        let results = search("SLEEP");
        assert!(results.iter().any(|track| track.name == "Sleep Potion"));
        assert!(results.iter().any(|track| track.category == "Deep Sleep Ops"));
    }

    #[test]
    fn test_search_matches_frequency_digits() {
        let results = search("136.1");
        assert!(!results.is_empty());
        assert!(results.iter().all(|track| track.frequency_hz == 136.1));
    }

    #[test]
    fn test_search_without_matches() {
        assert!(search("zzzz-not-a-tone").is_empty());
        assert_eq!(search("").len(), catalog_size());
    }
}
