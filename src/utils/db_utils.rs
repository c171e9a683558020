use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::QueryAs;
use utoipa::IntoParams;

/// Typed value for a `?` placeholder in a dynamically built WHERE clause.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Str(String),
    U64(u64),
    Date(NaiveDate),
}

pub fn bind_filters<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    args: &'q [FilterValue],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for arg in args {
        query = match arg {
            FilterValue::Str(s) => query.bind(s.as_str()),
            FilterValue::U64(v) => query.bind(*v),
            FilterValue::Date(d) => query.bind(*d),
        };
    }
    query
}

/// Log a database failure and hide it behind a generic 500.
pub fn internal_error(e: sqlx::Error, context: &str) -> actix_web::Error {
    tracing::error!(error = %e, "{context}");
    ErrorInternalServerError("Internal Server Error")
}

/// MySQL reports unique-key violations as SQLSTATE 23000.
pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

/// `%term%` for a case-insensitive `LIKE`, with the term's own wildcards escaped.
///
/// Pair with `LOWER(column) LIKE ?`; backslash is MySQL's default LIKE escape.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Inclusive `[start_date, end_date]` filter shared by the date-range endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// First day included, `YYYY-MM-DD`
    pub start_date: NaiveDate,
    /// Last day included, `YYYY-MM-DD`
    pub end_date: NaiveDate,
}

impl DateRangeQuery {
    pub fn validate(&self) -> actix_web::Result<(NaiveDate, NaiveDate)> {
        if self.start_date > self.end_date {
            return Err(ErrorBadRequest("start_date cannot be after end_date"));
        }
        Ok((self.start_date, self.end_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_lowercases() {
        assert_eq!(like_pattern("  Acme Supplies "), "%acme supplies%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn date_range_must_be_ordered() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();

        let ok = DateRangeQuery {
            start_date: d("2024-01-01"),
            end_date: d("2024-01-31"),
        };
        assert!(ok.validate().is_ok());

        let same_day = DateRangeQuery {
            start_date: d("2024-01-15"),
            end_date: d("2024-01-15"),
        };
        assert!(same_day.validate().is_ok());

        let reversed = DateRangeQuery {
            start_date: d("2024-02-01"),
            end_date: d("2024-01-01"),
        };
        assert!(reversed.validate().is_err());
    }
}
