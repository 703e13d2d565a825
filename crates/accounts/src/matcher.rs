/// Case-insensitive account name match.
///
/// Patterns containing `*` are globs where `*` matches any run of
/// characters (including none); anything else must match exactly.
pub fn name_matches(pattern: &str, name: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let name = name.to_lowercase();
    if pattern.contains('*') {
        glob_match(&pattern, &name)
    } else {
        pattern == name
    }
}

/// Returns true if `pattern` contains a wildcard.
pub fn is_pattern(name: &str) -> bool {
    name.contains('*')
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    let (Some((first, tail)), Some(last)) = (segments.split_first(), segments.last()) else {
        return pattern == text;
    };
    if tail.is_empty() {
        return pattern == text;
    }

    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    // Segments between the first and the last `*` float; take the earliest
    // occurrence of each.
    for segment in &tail[..tail.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(idx) => rest = &rest[idx + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}
