//! Utterance cleaning.
//!
//! `clean_text` strips URLs, `@mentions` and `^tags` from a single utterance
//! and collapses whitespace. Steps always run in this order:
//!
//! 1. URL (`http` followed by a non-whitespace run)
//! 2. mention (`@` followed by a non-whitespace run)
//! 3. whitespace runs -> single space
//! 4. caret tag (`^` followed by a run of non-space characters)
//!
//! The caret step runs after the collapse, so removing a tag that sits between
//! two spaces leaves those two spaces adjacent. Callers that build transcript
//! lines trim the result (see `pipeline::flatten_transcript`), which removes a
//! leading or trailing tag cleanly. Trimming does not touch a mid-line tag:
//! `"thanks ^AB for waiting"` becomes `"thanks  for waiting"` (two spaces),
//! both from `clean_text` and inside the transcript line.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").unwrap());
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[^\s]+").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static CARET_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^[^ ]+").unwrap());

/// Clean one utterance. Never fails; an empty string stays empty.
pub fn clean_text(text: &str) -> String {
    let text = URL_RE.replace_all(text, "");
    let text = MENTION_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    CARET_TAG_RE.replace_all(&text, "").into_owned()
}

/// Returns true when `text` still contains something the URL step would remove.
pub fn contains_url(text: &str) -> bool {
    URL_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::{clean_text, contains_url};

    #[test]
    fn strips_url_mention_and_collapses() {
        assert_eq!(
            clean_text("check this http://x.co @bob  now"),
            "check this now"
        );
    }

    #[test]
    fn caret_tag_removed_after_collapse() {
        // Trailing space is left for the caller to trim.
        assert_eq!(clean_text("ok ^tag"), "ok ");
        assert_eq!(clean_text("thanks\t^AB  "), "thanks  ");
    }

    #[test]
    fn mention_removal_leaves_bare_at_sign() {
        assert_eq!(clean_text("mail me @ home"), "mail me @ home");
        assert_eq!(clean_text("@AirlineCo help"), " help");
    }

    #[test]
    fn url_glued_to_word_is_removed_to_token_end() {
        let out = clean_text("see:https://t.co/abc?x=1 please");
        assert_eq!(out, "see: please");
        assert!(!contains_url(&out));
    }

    #[test]
    fn newlines_become_single_spaces() {
        assert_eq!(clean_text("line one\n\n  line two"), "line one line two");
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean_text(""), "");
    }
}
