use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn points_from_i64(v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid points: {v}")))
}

pub(crate) fn points_to_i64(v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization("points overflow".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_points_are_rejected() {
        assert!(points_from_i64(-1).is_err());
        assert_eq!(points_from_i64(42).unwrap(), 42);
        assert!(points_to_i64(u64::MAX).is_err());
    }
}
