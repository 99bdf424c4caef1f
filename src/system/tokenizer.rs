// src/system/tokenizer.rs

use crate::system::error::ExecutionError;

/// Splits each input with POSIX shell rules and flattens the words, in order.
///
/// Inputs are tokenized independently, so `split_all(&["git tag", "'v1.0.0'"])` is the
/// same as splitting `git tag v1.0.0`. Quote characters are removed, backslash escapes
/// are honored.
///
/// # Errors
/// Returns [`ExecutionError::MalformedShellSyntax`] with the offending input when its
/// quoting is not terminated.
pub fn split_all<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>, ExecutionError> {
    let mut tokens = Vec::with_capacity(inputs.len() * 2);
    for input in inputs {
        let input = input.as_ref();
        let words = shlex::split(input).ok_or_else(|| ExecutionError::MalformedShellSyntax {
            input: input.to_string(),
        })?;
        tokens.extend(words);
    }
    Ok(tokens)
}

/// Quotes every token so that splitting the result yields the same tokens again.
/// Tokens containing a NUL byte cannot be represented and are rendered lossily.
pub fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| {
            shlex::try_quote(token.as_ref())
                .map(|quoted| quoted.into_owned())
                .unwrap_or_else(|_| token.as_ref().replace('\0', ""))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_all_flattens_in_order() {
        let tokens = split_all(&["git tag", "'v1.0.0'", "-m \"first release\""]).unwrap();
        assert_eq!(tokens, vec!["git", "tag", "v1.0.0", "-m", "first release"]);
    }

    #[test]
    fn test_split_handles_escapes() {
        let tokens = split_all(&[r"echo a\ b 'c d' e"]).unwrap();
        assert_eq!(tokens, vec!["echo", "a b", "c d", "e"]);
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let err = split_all(&["ok", "echo 'unterminated"]).unwrap_err();
        match err {
            ExecutionError::MalformedShellSyntax { input } => {
                assert_eq!(input, "echo 'unterminated");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(split_all(&["   ", "\t"]).unwrap().is_empty());
    }

    #[test]
    fn test_join_quotes_when_needed() {
        assert_eq!(join(&["git", "commit", "-m", "a message"]), "git commit -m 'a message'");
    }

    proptest! {
        #[test]
        fn prop_join_then_split_round_trips(tokens in prop::collection::vec("[a-zA-Z0-9 '\"=._*-]{1,12}", 1..6)) {
            let line = join(&tokens);
            let split = split_all(&[line]).unwrap();
            prop_assert_eq!(split, tokens);
        }
    }
}
