/// Characters never allowed in a remote path segment.
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a logical name safe for use as a single remote path segment.
///
/// Leading and trailing whitespace is trimmed; every remaining unsafe
/// character, control character, or interior whitespace becomes `_`.
/// Sanitizing an already-sanitized name is a no-op.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || UNSAFE_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}
