//! Small string helpers for page names and titles.

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest: `user_profile-v2` → `User_Profile-V2`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// First `max` chars of `s`.
pub fn preview(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_follows_word_runs() {
        assert_eq!(title_case("user_profile-v2"), "User_Profile-V2");
        assert_eq!(title_case("API"), "Api");
        assert_eq!(title_case("payment processor"), "Payment Processor");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("hi", 10), "hi");
    }
}
