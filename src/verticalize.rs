/// Uppercase `text` and stack the letters of each word one per line,
/// with a blank line between words. Whitespace-only input yields "".
pub fn verticalize(text: &str) -> String {
    text.to_uppercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(String::from)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_words() {
        assert_eq!(
            verticalize("hello world"),
            "H\nE\nL\nL\nO\n\nW\nO\nR\nL\nD"
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(verticalize(""), "");
        assert_eq!(verticalize("   "), "");
        assert_eq!(verticalize("\n\t "), "");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(verticalize("  a \n\n b\tc  "), "A\n\nB\n\nC");
    }

    #[test]
    fn test_keeps_digits_and_punctuation() {
        assert_eq!(verticalize("r2-d2!"), "R\n2\n-\nD\n2\n!");
    }

    #[test]
    fn test_unicode_uppercasing() {
        assert_eq!(verticalize("привет"), "П\nР\nИ\nВ\nЕ\nТ");
        // ß uppercases to two letters
        assert_eq!(verticalize("straße"), "S\nT\nR\nA\nS\nS\nE");
    }

    #[test]
    fn test_block_count_matches_word_count() {
        let input = "the quick  brown\tfox jumps";
        let out = verticalize(input);
        assert_eq!(
            out.split("\n\n").count(),
            input.split_whitespace().count()
        );
        assert!(out.chars().all(|c| c == '\n' || !c.is_lowercase()));
    }

    #[test]
    fn test_is_deterministic() {
        let input = "same input twice";
        assert_eq!(verticalize(input), verticalize(input));
    }
}
