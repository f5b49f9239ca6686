use rand::{distributions::Alphanumeric, Rng};

const SUFFIX_LEN: usize = 8;

/// Generate a collection-local id: `"{prefix}-{8 random lowercase alphanumerics}"`.
///
/// Ids are only unique within a session's collections; nothing coordinates
/// them across sessions.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_and_suffix() {
        let id = generate_id("phase");
        assert!(id.starts_with("phase-"));
        assert_eq!(id.len(), "phase-".len() + SUFFIX_LEN);
        assert!(id["phase-".len()..]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate_id("ms"), generate_id("ms"));
    }
}
