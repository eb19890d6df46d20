use serde::{Deserialize, Serialize};

use crate::drive::FileEntry;

/// Find/replace/append rules applied to every file name in a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRules {
    /// Substring to look for; empty disables replacement
    pub find: String,
    pub replace: String,
    /// Text spliced in before the extension; empty disables appending
    pub append: String,
}

/// A single pending rename; `old_name` and `new_name` always differ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOperation {
    pub file_id: String,
    pub old_name: String,
    pub new_name: String,
}

/// Compute the new name for a single file
pub fn apply_rules(name: &str, rules: &RenameRules) -> String {
    let mut new_name = if rules.find.is_empty() {
        name.to_string()
    } else {
        name.replace(&rules.find, &rules.replace)
    };

    if !rules.append.is_empty() {
        match new_name.rfind('.') {
            Some(dot) => new_name.insert_str(dot, &rules.append),
            None => new_name.push_str(&rules.append),
        }
    }

    new_name
}

/// Plan renames for a batch of files, skipping names the rules leave unchanged
///
/// Pure and cheap enough to run on every keystroke of a live preview.
pub fn plan_renames(files: &[FileEntry], rules: &RenameRules) -> Vec<RenameOperation> {
    files
        .iter()
        .filter_map(|file| {
            let new_name = apply_rules(&file.name, rules);
            (new_name != file.name).then(|| RenameOperation {
                file_id: file.id.clone(),
                old_name: file.name.clone(),
                new_name,
            })
        })
        .collect()
}

/// Old and new name split around the part that changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChange<'a> {
    pub prefix: &'a str,
    pub removed: &'a str,
    pub added: &'a str,
    pub suffix: &'a str,
}

/// Split two names into their common prefix, the differing middles and the common suffix
pub fn diff_names<'a>(old: &'a str, new: &'a str) -> NameChange<'a> {
    let prefix_len: usize = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();

    let old_rest = &old[prefix_len..];
    let new_rest = &new[prefix_len..];

    let suffix_len: usize = old_rest
        .chars()
        .rev()
        .zip(new_rest.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();

    NameChange {
        prefix: &old[..prefix_len],
        removed: &old_rest[..old_rest.len() - suffix_len],
        added: &new_rest[..new_rest.len() - suffix_len],
        suffix: &old_rest[old_rest.len() - suffix_len..],
    }
}

/// Pair every planned operation with what changed in its name
pub fn preview(operations: &[RenameOperation]) -> Vec<(&RenameOperation, NameChange<'_>)> {
    operations
        .iter()
        .map(|op| (op, diff_names(&op.old_name, &op.new_name)))
        .collect()
}
