use ahash::AHashSet;

/// Produces a display name no existing node uses.
///
/// The proposed name is returned unchanged when it is free. Otherwise trailing digits
/// are stripped and a counter starting at 2 is appended until the name is free:
/// with `["Code", "Code2"]` taken, `"Code"` becomes `"Code3"`.
pub fn auto_name<'a>(existing: impl IntoIterator<Item = &'a str>, proposed: &str) -> String {
    let taken: AHashSet<&str> = existing.into_iter().collect();
    let base = proposed.trim_end_matches(|c: char| c.is_ascii_digit());

    let mut candidate = proposed.to_string();
    let mut counter = 1u64;
    while taken.contains(candidate.as_str()) {
        counter += 1;
        candidate = format!("{}{}", base, counter);
    }
    candidate
}
