// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default export filename.

use crate::header::HeaderInfo;

/// Stem used when the header does not provide enough to name the file.
pub const FALLBACK_STEM: &str = "시험지";

/// Derive the default PDF filename from the raw (unresolved) header.
///
/// `{school}_{subject}.pdf`, with the school replaced by `시험지` when empty.
/// Without a subject the name is just `시험지.pdf`.
pub fn derive_filename(header: &HeaderInfo) -> String {
    let subject = header.subject.trim();
    if subject.is_empty() {
        return format!("{FALLBACK_STEM}.pdf");
    }
    let school = match header.school_name.trim() {
        "" => FALLBACK_STEM,
        name => name,
    };
    format!("{}_{}.pdf", sanitize(school), sanitize(subject))
}

/// Replace characters that are not allowed in file names on common platforms.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(school: &str, subject: &str) -> HeaderInfo {
        HeaderInfo {
            school_name: school.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    #[test]
    fn school_and_subject() {
        assert_eq!(derive_filename(&header("한빛고등학교", "수학")), "한빛고등학교_수학.pdf");
    }

    #[test]
    fn missing_school_uses_fallback_stem() {
        assert_eq!(derive_filename(&header("", "수학")), "시험지_수학.pdf");
    }

    #[test]
    fn missing_subject_uses_generic_name() {
        assert_eq!(derive_filename(&header("", "")), "시험지.pdf");
        assert_eq!(derive_filename(&header("한빛고등학교", "  ")), "시험지.pdf");
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(derive_filename(&header("A/B", "수학 I:II")), "A_B_수학 I_II.pdf");
    }
}
