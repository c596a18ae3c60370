//! Extractive summarizer: a deterministic, non-semantic length heuristic.
//!
//! Bodies are split into sentence-like fragments on `". "`, short fragments
//! are discarded, and the longest survivors are concatenated verbatim. No
//! external model is involved and the same input always yields the same
//! output.

/// Fixed sentence delimiter the bodies are split on.
pub const SENTENCE_DELIMITER: &str = ". ";

/// Summarize `bodies` (expected in ranking order) into at most
/// `max_fragments` of the longest fragments.
///
/// Fragments survive only when strictly longer than `min_chars` characters.
/// Survivors are stable-sorted by descending character length, so equally
/// long fragments keep their order of appearance. The result always ends
/// with a period; with zero survivors it is exactly `"."`.
#[must_use]
pub fn summarize(bodies: &[String], max_fragments: usize, min_chars: usize) -> String {
    let mut fragments: Vec<&str> = bodies
        .iter()
        .flat_map(|body| body.split(SENTENCE_DELIMITER))
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > min_chars)
        .collect();

    fragments.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    fragments.truncate(max_fragments);

    let mut summary = fragments.join(SENTENCE_DELIMITER);
    summary.push('.');
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 3;
    const MIN: usize = 30;

    fn bodies(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn picks_longest_fragments_in_descending_order() {
        let input = bodies(&[
            "Short one. This sentence is long enough to clear the threshold easily. \
             This fragment is even longer than the previous one and wins outright",
        ]);

        let summary = summarize(&input, MAX, MIN);

        assert_eq!(
            summary,
            "This fragment is even longer than the previous one and wins outright. \
             This sentence is long enough to clear the threshold easily."
        );
    }

    #[test]
    fn is_deterministic() {
        let input = bodies(&[
            "A fragment comfortably above the threshold of thirty chars. \
             Another fragment comfortably above the threshold of thirty",
            "Third fragment comfortably above that very same threshold here",
        ]);

        let first = summarize(&input, MAX, MIN);
        let second = summarize(&input, MAX, MIN);
        assert_eq!(first, second);
    }

    #[test]
    fn drops_fragments_at_or_below_threshold() {
        // Exactly 30 characters: discarded, matching the strict comparison
        let exactly_thirty = "abcdefghijklmnopqrstuvwxyz1234";
        assert_eq!(exactly_thirty.chars().count(), 30);

        let input = bodies(&[format!("{exactly_thirty}. tiny").as_str()]);

        assert_eq!(summarize(&input, MAX, MIN), ".");
    }

    #[test]
    fn all_short_input_yields_bare_period() {
        let input = bodies(&["tiny. bits. only", "more. small. stuff"]);
        assert_eq!(summarize(&input, MAX, MIN), ".");
    }

    #[test]
    fn fewer_survivors_than_requested_uses_what_exists() {
        let input = bodies(&["Only one sentence here is long enough to survive the cut"]);

        let summary = summarize(&input, MAX, MIN);

        assert_eq!(
            summary,
            "Only one sentence here is long enough to survive the cut."
        );
    }

    #[test]
    fn equal_lengths_keep_appearance_order() {
        let a = "aaaa aaaa aaaa aaaa aaaa aaaa first";
        let b = "bbbb bbbb bbbb bbbb bbbb bbbb secnd";
        assert_eq!(a.chars().count(), b.chars().count());

        let input = bodies(&[format!("{a}. {b}").as_str()]);

        let summary = summarize(&input, 2, MIN);
        assert_eq!(summary, format!("{a}. {b}."));
    }

    #[test]
    fn empty_input_yields_bare_period() {
        assert_eq!(summarize(&[], MAX, MIN), ".");
    }
}
