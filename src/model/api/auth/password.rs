pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Check a plaintext password against the complexity policy, returning one
/// message per failed rule. An empty list means the password is acceptable.
pub fn check_password_policy(password: &str) -> Vec<String> {
    let mut failures = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        failures.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        failures.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        failures.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failures.push("Password must contain at least one number".to_string());
    }
    if password.chars().all(char::is_alphanumeric) {
        failures.push("Password must contain at least one special character".to_string());
    }
    failures
}
