//! Helpers Module
//!
//! This module contains helper / simplifier functions that don't clearly belong in another module.

/// Returns "s" unless `count` is exactly one.
pub fn plural_s(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Join words as "A", "A and B", or "A, B, and C".
pub fn join_list_pretty(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [head @ .., last] => format!("{}, and {last}", head.join(", ")),
    }
}

/// Prefix a noun with "a" or "an".
pub fn with_article(noun: &str) -> String {
    let article = match noun.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    format!("{article} {noun}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn join_list_pretty_uses_oxford_comma() {
        assert_eq!(join_list_pretty(&[]), "");
        assert_eq!(join_list_pretty(&words(&["a rat"])), "a rat");
        assert_eq!(join_list_pretty(&words(&["a rat", "a bat"])), "a rat and a bat");
        assert_eq!(
            join_list_pretty(&words(&["a rat", "a bat", "2 cats"])),
            "a rat, a bat, and 2 cats"
        );
    }

    #[test]
    fn articles_follow_leading_vowel() {
        assert_eq!(with_article("ogre"), "an ogre");
        assert_eq!(with_article("goblin"), "a goblin");
        assert_eq!(plural_s(1), "");
        assert_eq!(plural_s(0), "s");
    }
}
