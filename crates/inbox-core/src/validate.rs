//! Shape checks for contact-form input.

use crate::ValidationError;

/// Trim a mandatory field, failing when it is absent or blank.
pub fn required(
  field: &'static str,
  value: Option<String>,
) -> Result<String, ValidationError> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
    .ok_or(ValidationError::Missing(field))
}

/// Accepts `local@domain.tld`: exactly one `@`, no whitespace, a non-empty
/// local part and a domain with a dot that has text on both sides.
pub fn is_valid_email(address: &str) -> bool {
  if address.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = address.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
    None => false,
  }
}

/// Trim every tag and drop the blank ones, keeping order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
  tags
    .into_iter()
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty())
    .collect()
}
