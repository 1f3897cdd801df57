use rand::RngCore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseEnvironment {
    Development,
    Production,
}

impl ReleaseEnvironment {
    pub fn value(&self) -> String {
        match *self {
            ReleaseEnvironment::Development => String::from("development"),
            ReleaseEnvironment::Production => String::from("production"),
        }
    }
}

/// Helper for separation of dev and prod concerns
pub fn parse_release_env(env: &str) -> ReleaseEnvironment {
    if env == "prod" {
        ReleaseEnvironment::Production
    } else {
        ReleaseEnvironment::Development
    }
}

/// 32 random bytes, hex encoded
pub fn generate_rnd() -> String {
    let mut data = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut data);
    hex::encode(data)
}

/// Document id with its collection prefix
pub fn generate_id(prefix: &str) -> String {
    format!("{}{}", prefix, generate_rnd())
}

pub fn now() -> i64 {
    chrono::offset::Utc::now().timestamp()
}

pub const fn string_limit() -> usize {
    512
}

/// Minimum accepted password length
pub const fn password_min() -> usize {
    6
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_rnd_test() {
        let rnd = generate_rnd();
        let actual = rnd.len();
        let expected = 64;
        assert_eq!(expected, actual);
        assert_ne!(rnd, generate_rnd());
    }

    #[test]
    fn generate_id_test() {
        let id = generate_id(crate::ORDER_DB_KEY);
        assert!(id.starts_with('o'));
        assert_eq!(id.len(), 65);
    }

    #[test]
    fn release_env_test() {
        assert_eq!(parse_release_env("prod"), ReleaseEnvironment::Production);
        assert_eq!(parse_release_env("dev"), ReleaseEnvironment::Development);
        assert_eq!(parse_release_env("staging"), ReleaseEnvironment::Development);
    }
}
