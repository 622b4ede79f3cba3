use std::collections::HashSet;

/// Merges the `args` of a container.
///
/// - `replace` replaces the base args entirely (it must not be combined with `add`/`delete`,
///   which is checked by the caller).
/// - `delete` removes every matching token. Deletion works on single tokens, so deleting `-g`
///   leaves the value following it in place.
/// - `add` appends every token that is neither deleted nor already present.
///
/// The surviving base tokens come first, followed by the added ones, both in their original
/// order.
pub fn merge_args(
    base: Option<&[String]>,
    replace: Option<&[String]>,
    add: Option<&[String]>,
    delete: Option<&[String]>,
) -> Vec<String> {
    let deleted: HashSet<&str> = delete.unwrap_or_default().iter().map(String::as_str).collect();
    let working = replace.or(base).unwrap_or_default();
    let present: HashSet<&str> = working.iter().map(String::as_str).collect();

    let kept = working
        .iter()
        .filter(|arg| !deleted.contains(arg.as_str()));
    let added = add
        .unwrap_or_default()
        .iter()
        .filter(|arg| !deleted.contains(arg.as_str()) && !present.contains(arg.as_str()));

    kept.chain(added).cloned().collect()
}
