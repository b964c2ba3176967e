//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! User input is only ever passed through `.bind()`. Nothing here formats
//! request data into SQL text.

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::BigInt;

/// `COUNT(*) OVER()`: the total row count before LIMIT/OFFSET.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// Filter expression `LOWER(users.email) = LOWER($1)`, served by the unique
/// index on `LOWER(email)`.
///
/// # Safety
/// The email is passed via `.bind()`, not interpolated.
#[macro_export]
macro_rules! email_equals_ignore_case {
    ($email:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(users.email) = LOWER(")
            .bind::<diesel::sql_types::Text, _>($email)
            .sql(")")
    };
}

/// Filter expression `LOWER(ingredients.name) = LOWER($1)`, served by the
/// unique index on `LOWER(name)`.
///
/// # Safety
/// The name is passed via `.bind()`, not interpolated.
#[macro_export]
macro_rules! ingredient_name_equals_ignore_case {
    ($name:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(ingredients.name) = LOWER(")
            .bind::<diesel::sql_types::Text, _>($name)
            .sql(")")
    };
}

/// Escapes LIKE metacharacters and wraps the needle for a substring match.
pub fn contains_pattern(needle: &str) -> String {
    format!(
        "%{}%",
        needle
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("salt"), "%salt%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
