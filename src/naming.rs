//! Remote secret name templating.

/// Build a fully-qualified remote secret name from a template.
///
/// `$key`, `$project`, and `$env` are substituted literally, in that order,
/// with no recursion and no escaping. A template without placeholders passes
/// through unchanged.
pub fn render_remote_name(format: &str, key: &str, project: &str, env: &str) -> String {
    format.replace("$key", key).replace("$project", project).replace("$env", env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        assert_eq!(render_remote_name("$env/$project/$key", "db", "acme", "staging"), "staging/acme/db");
    }

    #[test]
    fn test_production_tagged_env() {
        assert_eq!(render_remote_name("$env/$project/$key", "db", "acme", "prod"), "prod/acme/db");
    }

    #[test]
    fn test_placeholder_order_and_repeats() {
        assert_eq!(
            render_remote_name("$key-$key@$env", "db", "acme", "qa"),
            "db-db@qa"
        );
    }

    #[test]
    fn test_template_without_placeholders_passes_through() {
        assert_eq!(render_remote_name("static/name", "db", "acme", "qa"), "static/name");
    }

    #[test]
    fn test_malformed_placeholders_pass_through() {
        assert_eq!(
            render_remote_name("$environment/$proj/$key", "db", "acme", "qa"),
            // "$env" matches inside "$environment"; the rest is literal.
            "qaironment/$proj/db"
        );
    }
}
