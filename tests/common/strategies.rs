use proptest::prelude::*;
use push_request_core::request::Action;

/// Names made only of accepted characters
pub fn valid_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9._-]{1,40}"
}

/// Characters outside the accepted set
pub fn invalid_char_strategy() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("must be outside [a-zA-Z0-9._-]", |c| {
        !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    })
}

/// A valid name with one disallowed character spliced in
pub fn invalid_name_strategy() -> impl Strategy<Value = String> {
    (valid_name_strategy(), invalid_char_strategy(), any::<prop::sample::Index>()).prop_map(
        |(name, bad, index)| {
            let chars: Vec<char> = name.chars().collect();
            let at = index.index(chars.len() + 1);
            chars[..at]
                .iter()
                .copied()
                .chain(std::iter::once(bad))
                .chain(chars[at..].iter().copied())
                .collect()
        },
    )
}

pub fn action_strategy() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}
