use rand::Rng;

/// Alphabet the concurrency token is drawn from
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Length of the concurrency token stored with every customer
pub const TOKEN_LENGTH: usize = 20;

/// Produce a random alphanumeric string of the requested size.
///
/// The result is a conflict-detection value, not a credential; collisions
/// are accepted as negligible and no uniqueness is enforced across records.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn random_sized_string(size: usize) -> String {
    assert!(size > 0, "requested string size must be positive");

    let mut rng = rand::rng();
    (0..size)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Generate a fresh customer concurrency token
pub fn generate_token() -> String {
    random_sized_string(TOKEN_LENGTH)
}
