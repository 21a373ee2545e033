use rand::RngExt as _;

use super::PayloadSource;

/// Words the sentence generator picks from.
const LEXICON: &[&str] = &[
    "able", "about", "account", "acid", "across", "after", "again", "against", "agent", "air",
    "amount", "angle", "answer", "apple", "arch", "army", "attack", "attempt", "back", "balance",
    "band", "base", "basin", "basket", "bath", "bearing", "bell", "berry", "bird", "birth",
    "blade", "board", "boat", "body", "bone", "brain", "brake", "branch", "brass", "bread",
    "breath", "brick", "bridge", "brush", "bucket", "bulb", "burst", "butter", "button", "cable",
    "cake", "camera", "canvas", "card", "carriage", "cart", "chain", "chalk", "channel", "cheese",
    "circle", "cloud", "coal", "collector", "comb", "copper", "cord", "cotton", "curtain",
    "cushion", "daughter", "delivery", "design", "detail", "drain", "drawer", "engine", "event",
    "field", "finger", "flame", "floor", "flower", "frame", "garden", "glove", "grain", "harbor",
    "hammer", "island", "jewel", "kettle", "kernel", "knife", "ladder", "lantern", "letter",
    "market", "memory", "metric", "needle", "network", "ocean", "orange", "packet", "parcel",
    "pencil", "pipeline", "planet", "pocket", "queue", "rabbit", "record", "river", "router",
    "sail", "scale", "shelf", "shipping", "signal", "silver", "socket", "spring", "stamp",
    "station", "stream", "summer", "table", "thread", "ticket", "timer", "trace", "train",
    "tunnel", "umbrella", "valley", "vessel", "wagon", "window", "winter", "yellow",
];

/// Longest word in the lexicon,
/// which bounds how far a sentence payload can undershoot its target size.
pub const MAX_WORD_LEN: usize = 9;

/// Pseudo-random natural language payload.
///
/// The produced text approximates the requested size:
/// it is truncated at a word boundary and always ends with a period.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct SentencePayload;

impl SentencePayload {
    pub fn new() -> Self {
        Self
    }

    /// Generate a sentence of exactly `word_count` words.
    pub fn sentence(word_count: usize) -> String {
        let mut rng = rand::rng();
        let mut out = String::with_capacity(word_count * (MAX_WORD_LEN + 1));
        for i in 0..word_count {
            if i > 0 {
                out.push(' ');
            }
            push_word(&mut out, LEXICON[rng.random_range(0..LEXICON.len())], i == 0);
        }
        if word_count > 0 {
            out.push('.');
        }
        out
    }
}

impl PayloadSource for SentencePayload {
    fn produce(&self, size: usize) -> String {
        let mut rng = rand::rng();
        let mut out = String::with_capacity(size.max(MAX_WORD_LEN + 1));

        // first word is always written, even if it overshoots a tiny size
        push_word(&mut out, LEXICON[rng.random_range(0..LEXICON.len())], true);

        loop {
            let word = LEXICON[rng.random_range(0..LEXICON.len())];
            // separator + word + closing period
            if out.len() + 1 + word.len() + 1 > size {
                break;
            }
            out.push(' ');
            push_word(&mut out, word, false);
        }

        out.push('.');
        out
    }
}

fn push_word(out: &mut String, word: &str, capitalize: bool) {
    if !capitalize {
        out.push_str(word);
        return;
    }
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}
