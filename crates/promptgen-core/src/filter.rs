/// Indices of the candidates that contain every whitespace-separated token of
/// `query`, case-insensitively, in their original order.
///
/// An empty or all-blank query matches every candidate.
pub fn rank<S: AsRef<str>>(query: &str, candidates: &[S]) -> Vec<usize> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

    candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| {
            let haystack = candidate.as_ref().to_lowercase();
            tokens.iter().all(|token| haystack.contains(token.as_str()))
        })
        .map(|(i, _)| i)
        .collect()
}
