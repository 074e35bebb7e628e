//! Password hashing for stored accounts.

use argon2::{
    Argon2,
    password_hash::{
        Error,
        PasswordHash,
        PasswordHasher,
        PasswordVerifier,
        SaltString,
        rand_core::OsRng,
    },
};

/// Hash `pw` with a fresh random salt, returning the PHC string.
///
/// # Errors
/// Returns an error if the configured parameters reject the input.
pub fn hash_password(argon2: &Argon2, pw: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2.hash_password(pw.as_bytes(), &salt)?.to_string())
}

/// Check `pw` against a stored PHC string.
///
/// Parameters are read from the hash itself, so verification keeps working
/// after the configured costs change. A malformed hash never verifies.
#[must_use]
pub fn verify_password(argon2: &Argon2, hash: &str, pw: &str) -> bool {
    PasswordHash::new(hash)
        .is_ok_and(|parsed| argon2.verify_password(pw.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use argon2::Argon2;
    use rstest::rstest;

    use super::{hash_password, verify_password};

    #[rstest]
    fn round_trip_accepts_the_original_password() {
        let argon2 = Argon2::default();
        let hashed = hash_password(&argon2, "secret-pass").expect("hash");
        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify_password(&argon2, &hashed, "secret-pass"));
        assert!(!verify_password(&argon2, &hashed, "secret-pasS"));
    }

    #[rstest]
    fn salts_differ_between_calls() {
        let argon2 = Argon2::default();
        let a = hash_password(&argon2, "secret-pass").expect("hash");
        let b = hash_password(&argon2, "secret-pass").expect("hash");
        assert_ne!(a, b);
    }

    #[rstest]
    #[case("")]
    #[case("plaintext")]
    #[case("$2b$10$notanargonhash")]
    fn malformed_hash_never_verifies(#[case] stored: &str) {
        assert!(!verify_password(&Argon2::default(), stored, "plaintext"));
    }
}
