use kitty_domain::DomainError;

/// Shorthand for mapping foreign errors into [`DomainError`]
pub trait ResultExt<T, E> {
    /// Convert error to `DomainError::Infrastructure`
    fn to_infra_err(self) -> Result<T, DomainError>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn to_infra_err(self) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Infrastructure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_infra_err() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "log dir not writable",
        ));
        match result.to_infra_err() {
            Err(DomainError::Infrastructure(msg)) => assert_eq!(msg, "log dir not writable"),
            other => panic!("Expected Infrastructure error, got {other:?}"),
        }
    }
}
