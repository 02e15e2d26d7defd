// Principal lookup (the only place the submitting user is read from the OS)
use qthrottle_core::domain::{DomainError, Principal};
use tracing::debug;

const USER_VARS: [&str; 3] = ["USER", "LOGNAME", "USERNAME"];

/// Resolve the user the process runs as.
///
/// Unix: the password database entry for the real uid, falling back to
/// `$USER` / `$LOGNAME` / `$USERNAME` when the uid has no entry (containers
/// often lack one).
pub fn current_principal() -> Result<Principal, DomainError> {
    #[cfg(unix)]
    {
        use nix::unistd::{getuid, User};

        match User::from_uid(getuid()) {
            Ok(Some(user)) => return Principal::new(user.name),
            Ok(None) => debug!(uid = %getuid(), "No passwd entry for uid, using environment"),
            Err(e) => debug!(error = %e, "passwd lookup failed, using environment"),
        }
    }

    principal_from_env(|key| std::env::var(key).ok())
}

/// First non-blank user variable, in `USER_VARS` order
fn principal_from_env(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Principal, DomainError> {
    USER_VARS
        .iter()
        .find_map(|&key| lookup(key).filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| {
            DomainError::ValidationError("cannot determine the current user".to_string())
        })
        .and_then(|name| Principal::new(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_user_variable_used() {
        let principal = principal_from_env(lookup_in(&[("USER", "alice")])).unwrap();
        assert_eq!(principal.as_str(), "alice");
    }

    #[test]
    fn test_blank_user_falls_through_to_logname() {
        let principal =
            principal_from_env(lookup_in(&[("USER", "  "), ("LOGNAME", "bob")])).unwrap();
        assert_eq!(principal.as_str(), "bob");
    }

    #[test]
    fn test_user_takes_precedence_over_username() {
        let principal =
            principal_from_env(lookup_in(&[("USERNAME", "carol"), ("USER", "alice")])).unwrap();
        assert_eq!(principal.as_str(), "alice");
    }

    #[test]
    fn test_no_user_variables_is_error() {
        let err = principal_from_env(lookup_in(&[("HOME", "/root")])).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }
}
