/// Expand `${VAR}` and `${VAR:-fallback}` placeholders in raw config text.
///
/// A placeholder whose variable is unset and has no fallback is kept
/// verbatim, so a later parse error points at the original text.
pub fn substitute_env(input: &str) -> String {
    expand(input, |name| std::env::var(name).ok())
}

fn expand(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: copy the remainder untouched.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => {
                out.push_str("${");
                out.push_str(body);
                out.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "FLEET_TEST_VAR" => Some("hello".to_string()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(expand("key=${FLEET_TEST_VAR}", lookup), "key=hello");
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            expand("${FLEET_NONEXISTENT_XYZ}", lookup),
            "${FLEET_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn uses_fallback_for_unset_var() {
        assert_eq!(expand("tag = \"${FLEET_TAG:-fleet}\"", lookup), "tag = \"fleet\"");
        assert_eq!(expand("${FLEET_TEST_VAR:-other}", lookup), "hello");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(expand("a ${FLEET_TEST_VAR", lookup), "a ${FLEET_TEST_VAR");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
