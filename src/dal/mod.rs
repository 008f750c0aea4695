//! Data access: one module per resource, each a set of async functions over a
//! `SqliteConnection`. Handlers pass a pooled connection for reads and a
//! transaction when a change must land together with its audit event.

pub mod browse;
pub mod categories;
pub mod entries;
pub mod events;
pub mod roles;
pub mod search;
pub mod translation_states;
pub mod users;

pub(crate) const LIKE_ESCAPE: char = '!';

/// Escapes LIKE wildcards so user text only ever matches literally.
pub(crate) fn escape_like_pattern(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// `%term%` with wildcards escaped, for `LIKE ... ESCAPE '!'`.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like_pattern(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like_pattern("50%_off!"), "50!%!_off!!");
        assert_eq!(contains_pattern("hiša"), "%hiša%");
    }
}
