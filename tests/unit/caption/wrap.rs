use super::*;

#[test]
fn short_caption_is_untouched() {
    assert_eq!(wrap_caption("Hi", DEFAULT_WRAP_WIDTH), "Hi");
    assert_eq!(wrap_caption("", DEFAULT_WRAP_WIDTH), "");
    assert_eq!(wrap_caption("   ", DEFAULT_WRAP_WIDTH), "");
}

#[test]
fn wraps_greedily_on_word_boundaries() {
    let out = wrap_caption("the quick brown fox jumps over the lazy dog", 10);
    assert_eq!(out, "the quick\nbrown fox\njumps over\nthe lazy\ndog");
    for line in out.lines() {
        assert!(line.chars().count() <= 10);
    }
}

#[test]
fn collapses_whitespace_and_newlines() {
    assert_eq!(wrap_caption("a \n\t b   c", 50), "a b c");
}

#[test]
fn splits_overlong_words() {
    assert_eq!(wrap_caption("abcdefghij", 4), "abcd\nefgh\nij");
    assert_eq!(wrap_caption("ab cdefghij", 4), "ab c\ndefg\nhij");
    assert_eq!(wrap_caption("abcd efghijkl", 4), "abcd\nefgh\nijkl");
}

#[test]
fn counts_chars_not_bytes() {
    let out = wrap_caption("ééé ééé", 3);
    assert_eq!(out, "ééé\nééé");
}

#[test]
fn default_width_keeps_lines_within_fifty_chars() {
    let text = "Hippomelon goes home and falls asleep on his couch after a very long day at the park";
    let out = wrap_caption(text, DEFAULT_WRAP_WIDTH);
    assert!(out.lines().count() >= 2);
    assert!(out.lines().all(|l| l.chars().count() <= DEFAULT_WRAP_WIDTH));
    assert_eq!(out.replace('\n', " "), text);
}
