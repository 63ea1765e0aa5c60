use std::collections::BTreeMap;

use lazy_regex::{regex_replace, regex_replace_all};

use crate::models::{Submission, SubmissionId};

/// Submissions sharing one link after normalization. Only groups with more
/// than one member are surfaced; single submissions are not duplicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub link: String,
    pub submission_ids: Vec<SubmissionId>,
}

pub type LinkNormalizer = fn(&str) -> String;

/// The default policy: trim surrounding whitespace, compare exactly.
///
/// Deliberately blind to `www.` prefixes, trailing slashes and tracking
/// query parameters, matching how duplicates have always been flagged.
/// Use [`canonical`] where stronger matching is wanted.
pub fn exact(link: &str) -> String {
    link.trim().to_owned()
}

/// Stricter normalizer: forces https, drops a `www.` prefix, strips the
/// query string, fragment and any trailing slash.
pub fn canonical(link: &str) -> String {
    let link = link.trim();
    let link = regex_replace!(r#"^https?://(?:www\.)?"#, link, "https://");
    let link = regex_replace_all!(r#"[?#].*$"#, &link, "");
    link.trim_end_matches('/').to_owned()
}

pub fn duplicate_links(submissions: &[Submission]) -> Vec<DuplicateGroup> {
    duplicate_links_with(submissions, exact)
}

pub fn duplicate_links_with(
    submissions: &[Submission],
    normalize: LinkNormalizer,
) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<String, Vec<SubmissionId>> = BTreeMap::new();

    for submission in submissions {
        let Some(link) = submission.link.as_deref() else {
            continue;
        };

        let normalized = normalize(link);
        if normalized.is_empty() {
            continue;
        }

        groups.entry(normalized).or_default().push(submission.id);
    }

    groups
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(link, submission_ids)| DuplicateGroup {
            link,
            submission_ids,
        })
        .collect()
}
