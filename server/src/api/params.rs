//! Query-string helpers shared by the handlers.

use crate::error::{AppError, AppResult};
use crate::store::PageRequest;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

pub fn page_request(page: Option<i64>, size: Option<i64>, default_size: i64) -> PageRequest {
    PageRequest::new(page.unwrap_or(0), size.unwrap_or(default_size))
}

/// Splits a comma separated parameter and parses every item. One bad item
/// fails the whole request.
pub fn parse_list<T>(param: Option<&str>, name: &str) -> AppResult<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = param else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .map_err(|err| AppError::invalid(format!("Invalid value for {}: {}", name, err)))
        })
        .collect()
}

pub fn parse_ids(param: Option<&str>, name: &str) -> AppResult<Vec<Uuid>> {
    parse_list::<Uuid>(param, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CuisineType;

    #[test]
    fn test_parse_list_accepts_mixed_case_and_spaces() {
        let parsed: Vec<CuisineType> = parse_list(Some("italian, FRENCH,,"), "cuisines").unwrap();
        assert_eq!(parsed, vec![CuisineType::Italian, CuisineType::French]);
        assert!(parse_list::<CuisineType>(None, "cuisines").unwrap().is_empty());
    }

    #[test]
    fn test_parse_list_rejects_unknown_items() {
        let err = parse_list::<CuisineType>(Some("ITALIAN,KLINGON"), "cuisines").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(msg) if msg.contains("cuisines")));
        assert!(parse_ids(Some("not-a-uuid"), "includeIngredients").is_err());
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(page_request(None, None, 10), PageRequest::new(0, 10));
        assert_eq!(page_request(Some(3), Some(500), 10).size, PageRequest::MAX_SIZE);
    }
}
