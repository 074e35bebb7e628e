//! Case-insensitive substring matching shared by the search queries.
//!
//! Both backends agree on `lower(column) LIKE pattern ESCAPE '\'`, so keyword
//! search compiles to the same SQL everywhere. The keyword is lowered on the
//! Rust side with [`str::to_lowercase`] and its LIKE metacharacters are
//! escaped, which makes user input match literally.
//!
//! `SQLite`'s builtin `lower()` folds ASCII only, so every `SQLite` connection
//! replaces it with [`register_unicode_lower`]. PostgreSQL's `lower()` already
//! follows the database's Unicode collation.

#[cfg(feature = "sqlite")]
use diesel::{result::QueryResult, sqlite::SqliteConnection};
use diesel::{define_sql_function, sql_types::Text};

define_sql_function! {
    /// SQL `lower()`.
    fn lower(x: Text) -> Text;
}

/// Override `lower()` on `conn` with Rust's Unicode case folding.
///
/// Columns and keywords then fold identically, so `"Über"` finds
/// `"Überlingen Klinik"`.
///
/// # Errors
/// Returns any error raised while registering the function.
#[cfg(feature = "sqlite")]
pub fn register_unicode_lower(conn: &mut SqliteConnection) -> QueryResult<()> {
    lower_utils::register_impl(conn, |text: String| text.to_lowercase())
}

/// Escape character used with every `LIKE` built from [`contains_pattern`].
pub const LIKE_ESCAPE: char = '\\';

/// Turn a search keyword into a `LIKE` pattern matching it anywhere.
#[must_use]
pub fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::contains_pattern;

    #[rstest]
    #[case("hosp", "%hosp%")]
    #[case("HOSP", "%hosp%")]
    #[case("", "%%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("c:\\", "%c:\\\\%")]
    #[case("ÜBER", "%über%")]
    fn builds_escaped_pattern(#[case] keyword: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(keyword), expected);
    }
}
