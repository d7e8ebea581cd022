//! UUID generation and validation utilities.

use rand::Rng;
use thiserror::Error;
use uuid::{Builder, Uuid};

/// Errors that can occur during UUID validation.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::util::UuidValidationError;
///
/// let err = UuidValidationError::NilUuid;
/// assert!(matches!(err, UuidValidationError::NilUuid));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UuidValidationError {
    /// The UUID is nil (all zeros), which is not allowed.
    #[error("UUID is nil (all zeros) which is not allowed")]
    NilUuid,
    /// The UUID is not version 4.
    #[error("UUID is not version 4: expected version 4, found version {found}")]
    InvalidVersion {
        /// The version number that was found.
        found: usize,
    },
}

/// Validates that a UUID is not nil and is version 4.
///
/// # Errors
///
/// Returns `UuidValidationError::NilUuid` if the UUID is nil,
/// or `UuidValidationError::InvalidVersion` if the UUID is not version 4.
///
/// # Examples
///
/// ```
/// use cellular_potts::core::collections::Uuid;
/// use cellular_potts::core::util::{make_uuid, validate_uuid};
///
/// assert!(validate_uuid(&make_uuid()).is_ok());
/// assert!(validate_uuid(&Uuid::nil()).is_err());
/// ```
pub const fn validate_uuid(uuid: &Uuid) -> Result<(), UuidValidationError> {
    if uuid.is_nil() {
        return Err(UuidValidationError::NilUuid);
    }

    let version = uuid.get_version_num();
    if version != 4 {
        return Err(UuidValidationError::InvalidVersion { found: version });
    }

    Ok(())
}

/// Generates a version 4 [Uuid] from the operating system's entropy.
///
/// # Example
///
/// ```
/// use cellular_potts::core::util::make_uuid;
/// let uuid = make_uuid();
/// assert_eq!(uuid.get_version_num(), 4);
/// ```
#[must_use]
pub fn make_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Generates a version 4 [Uuid] from a caller-supplied random source.
///
/// Cells created during a seeded run take their identity from the run's
/// generator, so a replay with the same seed reproduces the same UUIDs.
///
/// # Example
///
/// ```
/// use cellular_potts::core::util::make_uuid_from_rng;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let a = make_uuid_from_rng(&mut StdRng::seed_from_u64(7));
/// let b = make_uuid_from_rng(&mut StdRng::seed_from_u64(7));
/// assert_eq!(a, b);
/// assert_eq!(a.get_version_num(), 4);
/// ```
pub fn make_uuid_from_rng<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let bytes: [u8; 16] = rng.random();
    Builder::from_random_bytes(bytes).into_uuid()
}
