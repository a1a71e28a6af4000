//! Prompt templates for the text model
//!
//! Each builder is a pure function of its inputs. Templates that expect
//! structured output state the required shape as a literal JSON skeleton
//! and demand no prose outside the JSON block; list limits and per-entry
//! length limits are imposed here, at generation time.

use crate::models::{RoadmapKind, User};

/// Maximum words retained per generation pass
pub const MAX_WORDS: usize = 5;
/// Maximum sentences retained per generation pass
pub const MAX_SENTENCES: usize = 5;
/// Maximum tokens allowed per generated sentence
pub const MAX_SENTENCE_TOKENS: usize = 5;
/// Maximum words allowed per roadmap topic
pub const MAX_TOPIC_WORDS: usize = 2;

/// Instruction for a bilingual word list on a topic
pub fn word_list_prompt(topic: &str) -> String {
    format!(
        r#"Generate EXACTLY one JSON object with a list of at most {MAX_WORDS} words related to the topic: {topic}, in Portuguese and English.
The two lists must have the same length and be index-aligned (words_en[i] translates words_pt[i]).
Use this format:

{{
    "words_pt": ["palavra1", "palavra2", "palavra3"],
    "words_en": ["word1", "word2", "word3"]
}}

IMPORTANT: Return ONLY the JSON, with no additional text."#
    )
}

/// Instruction for bilingual sentences built from a generated word list
pub fn sentence_prompt(words_pt: &[String], words_en: &[String]) -> String {
    format!(
        r#"Generate EXACTLY one JSON object with at most {MAX_SENTENCES} short descriptive sentences using these words, in Portuguese and English.
Portuguese words: {}
English words: {}
Each sentence must describe a visualizable action, simple enough for a child to picture. EACH SENTENCE MUST HAVE AT MOST {MAX_SENTENCE_TOKENS} WORDS.
The two lists must have the same length and be index-aligned.
Use this format:

{{
    "sentences_pt": [
        "Frase exemplo em portugues",
        "Outra frase em portugues"
    ],
    "sentences_en": [
        "Example sentence in English",
        "Another sentence in English"
    ]
}}

IMPORTANT: Return ONLY the JSON, with no additional text."#,
        words_pt.join(", "),
        words_en.join(", ")
    )
}

/// Instruction for a personalized study roadmap
///
/// Topics come back as short strings so the app can feed each one to the
/// content generator later.
pub fn roadmap_prompt(kind: RoadmapKind, user: &User, interest: &str) -> String {
    let audience = match kind {
        RoadmapKind::Student => {
            "The plan is for the user themselves, a child learning Libras."
        }
        RoadmapKind::Parent => {
            "The plan is for a guardian mediating their child's Libras learning; start from the easiest content."
        }
    };

    format!(
        r#"Create a study roadmap of Libras topics personalized for this user.
{audience}
User profile: experience level {}, interest: {interest}, available study time: {} minutes per session.
Order topics from easiest to hardest. EACH TOPIC MUST HAVE AT MOST {MAX_TOPIC_WORDS} WORDS.
Use this format:

{{
    "topics": ["topic one", "topic two", "topic three"]
}}

IMPORTANT: Return ONLY the JSON, with no additional text."#,
        user.experience_level.as_str(),
        user.learning_time,
    )
}

/// Phase introduction prompts, voiced by Cris the instructor
///
/// Returns `None` for an unknown phase.
pub fn introduction_prompt(tema: &str, fase: &str) -> Option<String> {
    let prompt = match fase {
        "palavras" => format!(
            "You are Cris, a friendly and enthusiastic Libras instructor. \
             Generate a short introduction (2-3 sentences) for a lesson about: {tema}, \
             where you will teach basic words/signs related to this topic. \
             The introduction must be welcoming and motivating. You are talking to a child. \
             Invite them to learn these new words."
        ),
        "frases" => format!(
            "You are Cris, a friendly and enthusiastic Libras instructor. \
             Generate a short introduction (2-3 sentences) for the part of the lesson where students \
             learn to build sentences using the {tema} words/signs they just learned. \
             The introduction must be encouraging and show learning progress. You are talking to a child. \
             Invite them to learn these sentences."
        ),
        "jogos" => format!(
            "You are Cris, a friendly and enthusiastic Libras instructor. \
             Generate a short introduction (2-3 sentences) for the part of the lesson where students \
             practice the {tema} signs through a memory game. \
             The introduction must be fun and exciting. You are talking to a child. \
             Invite them to learn by playing."
        ),
        _ => return None,
    };

    Some(prompt)
}

/// Standing instructions prepended to every chat history
pub fn chat_preprompt() -> &'static str {
    "You are Cris, a virtual Libras assistant. \
     Never describe hand signs; only write the words themselves. \
     Remember your role is teaching Libras: be direct and brief. \
     Every answer must stay focused on teaching Libras."
}
