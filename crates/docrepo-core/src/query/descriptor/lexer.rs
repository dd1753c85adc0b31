use crate::query::descriptor::DescriptorError;

/// Explicit nested-path separator token.
pub(super) const PATH_SEPARATOR: &str = "_";

/// Split a camel-case descriptor into words.
///
/// A word starts at every uppercase letter; digits stay attached to the word
/// they follow; `_` is emitted as its own token. A leading lowercase run
/// (a method verb such as `find`) forms the first word.
pub(super) fn words(input: &str) -> Result<Vec<&str>, DescriptorError> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in input.char_indices() {
        if ch == '_' {
            if let Some(s) = start.take() {
                out.push(&input[s..i]);
            }
            out.push(&input[i..=i]);
            continue;
        }

        if !ch.is_ascii_alphanumeric() {
            return Err(DescriptorError::InvalidCharacter {
                descriptor: input.to_string(),
                character: ch,
                position: i,
            });
        }

        match start {
            Some(s) if ch.is_ascii_uppercase() => {
                out.push(&input[s..i]);
                start = Some(i);
            }
            Some(_) => {}
            None => start = Some(i),
        }
    }

    if let Some(s) = start {
        out.push(&input[s..]);
    }

    Ok(out)
}

/// Index of the first word of a suffix spelling exactly `keyword`, if any.
pub(super) fn ends_with_keyword(words: &[&str], keyword: &str) -> Option<usize> {
    let mut len = 0;
    for (taken, word) in words.iter().rev().enumerate() {
        len += word.len();
        if len == keyword.len() {
            let split = words.len() - taken - 1;
            let suffix: String = words[split..].concat();
            return (suffix == keyword).then_some(split);
        }
        if len > keyword.len() {
            return None;
        }
    }

    None
}

/// True if the word at `index` is followed by a capitalized word.
pub(super) fn followed_by_capital(words: &[&str], index: usize) -> bool {
    words
        .get(index + 1)
        .and_then(|next| next.chars().next())
        .is_some_and(|ch| ch.is_ascii_uppercase())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_capitals_and_separator() {
        let out = words("findFirst10ByAddress_CityAndAgeGreaterThan").expect("should lex");

        assert_eq!(
            out,
            vec![
                "find", "First10", "By", "Address", "_", "City", "And", "Age", "Greater",
                "Than"
            ]
        );
    }

    #[test]
    fn non_alphanumeric_characters_are_rejected() {
        let err = words("Name-Email").expect_err("dash should be rejected");

        assert!(matches!(
            err,
            DescriptorError::InvalidCharacter {
                character: '-',
                position: 4,
                ..
            }
        ));
    }

    #[test]
    fn keyword_suffix_respects_word_boundaries() {
        let w = ["Age", "Greater", "Than", "Equal"];

        assert_eq!(ends_with_keyword(&w, "GreaterThanEqual"), Some(1));
        assert_eq!(ends_with_keyword(&w, "ThanEqual"), Some(2));
        assert_eq!(ends_with_keyword(&w, "Equal"), Some(3));
        assert_eq!(ends_with_keyword(&w, "qual"), None);
        assert_eq!(ends_with_keyword(&["Login"], "In"), None);
    }
}
