//! Lookup tables behind input classification and response enrichment.
//!
//! Kept as plain data so each table can be read, swapped and tested on its own.

use super::types::{Emotion, IntensityBucket, ModeKind};

/// Emotion keywords in tie-break order. Neutral has no keywords; it is the default.
pub const EMOTION_KEYWORDS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Joy,
        &[
            "happy", "glad", "joy", "joyful", "excited", "delighted", "thrilled", "wonderful",
            "great", "love", "grateful", "cheerful", "pleased", "amazing",
        ],
    ),
    (
        Emotion::Sadness,
        &[
            "sad", "unhappy", "depressed", "lonely", "miserable", "cry", "crying", "grief",
            "grieving", "heartbroken", "losing", "lost", "loss", "hopeless", "miss",
        ],
    ),
    (
        Emotion::Anger,
        &[
            "angry", "mad", "furious", "annoyed", "irritated", "hate", "rage", "outraged",
            "frustrated", "livid", "resent",
        ],
    ),
    (
        Emotion::Fear,
        &[
            "afraid", "scared", "fear", "frightened", "terrified", "anxious", "worried",
            "nervous", "panic", "dread",
        ],
    ),
    (
        Emotion::Surprise,
        &[
            "surprised", "shocked", "amazed", "astonished", "unexpected", "wow", "stunned",
            "suddenly",
        ],
    ),
    (
        Emotion::Contempt,
        &[
            "disgusted", "contempt", "pathetic", "despise", "worthless", "ridiculous", "scorn",
            "disgusting",
        ],
    ),
];

pub const INTENSIFIERS: &[&str] = &[
    "very",
    "extremely",
    "so",
    "really",
    "incredibly",
    "absolutely",
    "totally",
    "completely",
];
pub const MODERATORS: &[&str] = &["quite", "fairly", "pretty", "rather"];
pub const DIMINISHERS: &[&str] = &["slightly", "somewhat", "little", "barely", "kinda", "mildly"];

pub const QUESTION_WORDS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", "which", "do", "does", "did", "can", "could",
    "would", "will", "is", "are", "should",
];
pub const COMMAND_WORDS: &[&str] = &[
    "tell", "show", "give", "help", "let", "please", "stop", "explain", "describe", "go", "come",
    "listen",
];

/// Words never reported as topics
pub const STOPWORDS: &[&str] = &[
    "the", "and", "you", "for", "are", "but", "not", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "his", "how", "its", "who", "did", "get", "has", "him", "let", "may",
    "she", "too", "use", "about", "feel", "feeling", "felt", "that", "this", "with", "have",
    "from", "they", "them", "what", "when", "where", "which", "would", "could", "should", "there",
    "their", "been", "were", "just", "like", "into", "your", "some", "than", "then", "also",
    "because", "want", "know", "think", "much", "more", "i'm", "it's", "don't", "can't", "why",
    "yes", "now", "me", "my",
];

pub const MEMORY_KEYWORDS: &[&str] = &[
    "remember",
    "remembered",
    "memory",
    "memories",
    "childhood",
    "ago",
    "past",
    "forgot",
    "forget",
];

pub const RELATIONSHIP_KEYWORDS: &[&str] = &[
    "friend",
    "friends",
    "friendship",
    "trust",
    "together",
    "family",
    "relationship",
    "partner",
    "betray",
    "betrayed",
    "hurt",
    "forgive",
    "us",
];

pub const GROWTH_KEYWORDS: &[&str] = &[
    "learn", "learned", "change", "changed", "grow", "growing", "realize", "realized",
    "understand", "better",
];

/// Intensity a response must reach to count as a development moment on its own
pub const DEVELOPMENT_INTENSITY: f64 = 0.7;

/// Progress credited per turn, plus the bonuses for development and relationship turns
pub const PROGRESS_PER_TURN: f64 = 0.05;
pub const PROGRESS_DEVELOPMENT_BONUS: f64 = 0.05;
pub const PROGRESS_RELATIONSHIP_BONUS: f64 = 0.02;

pub fn body_language(emotion: Emotion, bucket: IntensityBucket) -> &'static str {
    use IntensityBucket::*;

    match (emotion, bucket) {
        (Emotion::Joy, Low) => "a faint smile tugs at their lips",
        (Emotion::Joy, Medium) => "smiles openly, shoulders relaxed",
        (Emotion::Joy, High) => "beams, practically bouncing with energy",
        (Emotion::Sadness, Low) => "glances down, voice softening",
        (Emotion::Sadness, Medium) => "shoulders slump, gaze drifting away",
        (Emotion::Sadness, High) => "hugs themselves, eyes glistening",
        (Emotion::Anger, Low) => "jaw tightens slightly",
        (Emotion::Anger, Medium) => "arms crossed, brow furrowed",
        (Emotion::Anger, High) => "fists clenched, leaning forward sharply",
        (Emotion::Fear, Low) => "shifts their weight uneasily",
        (Emotion::Fear, Medium) => "glances around, fidgeting with their hands",
        (Emotion::Fear, High) => "backs away, breath quick and shallow",
        (Emotion::Surprise, Low) => "raises an eyebrow",
        (Emotion::Surprise, Medium) => "eyes widen, head tilting",
        (Emotion::Surprise, High) => "steps back, mouth falling open",
        (Emotion::Contempt, Low) => "a slight curl of the lip",
        (Emotion::Contempt, Medium) => "rolls their eyes, half-turning away",
        (Emotion::Contempt, High) => "looks down their nose with a cold sneer",
        (Emotion::Neutral, Low) => "sits still, expression unreadable",
        (Emotion::Neutral, Medium) => "holds steady eye contact",
        (Emotion::Neutral, High) => "leans in attentively",
    }
}

/// Voice tone for an emotion in a mode, falling back to the emotion's default tone
pub fn voice_tone(emotion: Emotion, mode: ModeKind) -> &'static str {
    match (emotion, mode) {
        (Emotion::Sadness, ModeKind::Therapy) => "gentle and unhurried",
        (Emotion::Sadness, ModeKind::Bonding) => "soft and open",
        (Emotion::Anger, ModeKind::Therapy) => "tight but controlled",
        (Emotion::Anger, ModeKind::Conflict) => "sharp and clipped",
        (Emotion::Contempt, ModeKind::Conflict) => "cold and cutting",
        (Emotion::Joy, ModeKind::Romantic) => "warm and tender",
        (Emotion::Joy, ModeKind::Bonding) => "easy and affectionate",
        (Emotion::Joy, ModeKind::Adventure) => "bright and eager",
        (Emotion::Fear, ModeKind::Adventure) => "hushed and urgent",
        (Emotion::Neutral, ModeKind::Mentoring) => "measured and patient",
        (emotion, _) => default_voice_tone(emotion),
    }
}

fn default_voice_tone(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Joy => "bright",
        Emotion::Sadness => "quiet and heavy",
        Emotion::Anger => "tense",
        Emotion::Fear => "shaky",
        Emotion::Surprise => "rising with disbelief",
        Emotion::Contempt => "flat and dismissive",
        Emotion::Neutral => "even",
    }
}

/// Line spoken when a conversation switches into `mode`
pub fn transition_line(mode: ModeKind) -> &'static str {
    match mode {
        ModeKind::Casual => "Let's keep things light for a bit.",
        ModeKind::Therapy => "Let's slow down and look at how you're really feeling.",
        ModeKind::Conflict => "There's something we need to talk about, and it won't be easy.",
        ModeKind::Bonding => "I'd like to get to know you better.",
        ModeKind::Romantic => "Being here with you like this... it feels different.",
        ModeKind::Mentoring => "Let me show you something that might help.",
        ModeKind::Adventure => "Come on, there's something out there waiting for us!",
    }
}

/// In-character line used when the response generator fails
pub fn fallback_line(mode: ModeKind) -> &'static str {
    match mode {
        ModeKind::Casual => "Hm, give me a second. I lost my train of thought.",
        ModeKind::Therapy => "I hear you. Let me sit with that for a moment.",
        ModeKind::Conflict => "I... need a moment before I answer that.",
        ModeKind::Bonding => "That means a lot. Let me think about how to say this.",
        ModeKind::Romantic => "You've caught me off guard. Give me a moment.",
        ModeKind::Mentoring => "Good question. Let me consider it carefully.",
        ModeKind::Adventure => "Hold that thought, something doesn't feel right here.",
    }
}

/// Emotions a mode is meant to draw out
pub fn preferred_emotions(mode: ModeKind) -> &'static [Emotion] {
    match mode {
        ModeKind::Casual => &[Emotion::Joy, Emotion::Neutral, Emotion::Surprise],
        ModeKind::Therapy => &[Emotion::Sadness, Emotion::Fear, Emotion::Neutral],
        ModeKind::Conflict => &[Emotion::Anger, Emotion::Contempt, Emotion::Fear],
        ModeKind::Bonding => &[Emotion::Joy, Emotion::Sadness, Emotion::Neutral],
        ModeKind::Romantic => &[Emotion::Joy, Emotion::Surprise],
        ModeKind::Mentoring => &[Emotion::Neutral, Emotion::Joy],
        ModeKind::Adventure => &[Emotion::Joy, Emotion::Fear, Emotion::Surprise],
    }
}

/// How a turn in `emotion` colours the relationship
pub fn relationship_impact(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Joy => "draws them closer",
        Emotion::Sadness => "invites comfort and vulnerability",
        Emotion::Anger => "strains the bond",
        Emotion::Fear => "tests how safe they feel together",
        Emotion::Surprise => "shifts how they see each other",
        Emotion::Contempt => "erodes mutual respect",
        Emotion::Neutral => "keeps things steady",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_emotion_but_neutral_has_keywords() {
        for emotion in Emotion::ALL {
            let listed = EMOTION_KEYWORDS.iter().any(|(e, _)| *e == emotion);
            assert_eq!(listed, emotion != Emotion::Neutral, "{}", emotion);
        }
    }

    #[test]
    fn test_voice_tone_fallback() {
        assert_eq!(voice_tone(Emotion::Sadness, ModeKind::Therapy), "gentle and unhurried");
        assert_eq!(voice_tone(Emotion::Sadness, ModeKind::Adventure), "quiet and heavy");
    }

    #[test]
    fn test_every_mode_prefers_something() {
        for mode in ModeKind::ALL {
            assert!(!preferred_emotions(mode).is_empty());
            assert!(!transition_line(mode).is_empty());
            assert!(!fallback_line(mode).is_empty());
        }
    }
}
