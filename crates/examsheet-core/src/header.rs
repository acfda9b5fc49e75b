// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Exam header metadata and its display form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHOOL_NAME: &str = "OO고등학교";
pub const DEFAULT_EXAM_TITLE: &str = "1학기 중간고사";
pub const DEFAULT_SUBJECT: &str = "과목명";
pub const DEFAULT_GRADE: &str = "학년";
pub const DEFAULT_TIME_LIMIT: &str = "50분";
pub const DEFAULT_TEACHER_NAME: &str = "홍길동";

/// Exam metadata as entered in the editor. Replaced wholesale on edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderInfo {
    pub school_name: String,
    pub exam_title: String,
    pub subject: String,
    /// Class / grade label, e.g. "2학년 3반".
    pub grade: String,
    pub date: String,
    pub time_limit: String,
    pub teacher_name: String,
    /// Declared question count, display only. Zero means "use the image count".
    pub total_questions: u32,
}

/// Header with every empty field replaced by its display default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeader {
    pub school_name: String,
    pub exam_title: String,
    pub subject: String,
    pub grade: String,
    pub date: String,
    pub time_limit: String,
    pub teacher_name: String,
    pub total_questions: u32,
}

impl HeaderInfo {
    /// Substitute defaults for empty fields.
    ///
    /// `today` fills an empty date; `image_count` fills a zero question count.
    pub fn resolve(&self, image_count: usize, today: NaiveDate) -> ResolvedHeader {
        ResolvedHeader {
            school_name: or_default(&self.school_name, DEFAULT_SCHOOL_NAME),
            exam_title: or_default(&self.exam_title, DEFAULT_EXAM_TITLE),
            subject: or_default(&self.subject, DEFAULT_SUBJECT),
            grade: or_default(&self.grade, DEFAULT_GRADE),
            date: if self.date.trim().is_empty() {
                today.format("%Y-%m-%d").to_string()
            } else {
                self.date.clone()
            },
            time_limit: or_default(&self.time_limit, DEFAULT_TIME_LIMIT),
            teacher_name: or_default(&self.teacher_name, DEFAULT_TEACHER_NAME),
            total_questions: if self.total_questions == 0 {
                u32::try_from(image_count).unwrap_or(u32::MAX)
            } else {
                self.total_questions
            },
        }
    }

    /// [`HeaderInfo::resolve`] against the local calendar date.
    pub fn resolve_today(&self, image_count: usize) -> ResolvedHeader {
        self.resolve(image_count, chrono::Local::now().date_naive())
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 23).expect("valid date")
    }

    #[test]
    fn empty_header_gets_defaults() {
        let resolved = HeaderInfo::default().resolve(7, day());
        assert_eq!(resolved.school_name, "OO고등학교");
        assert_eq!(resolved.exam_title, "1학기 중간고사");
        assert_eq!(resolved.subject, "과목명");
        assert_eq!(resolved.grade, "학년");
        assert_eq!(resolved.date, "2026-04-23");
        assert_eq!(resolved.time_limit, "50분");
        assert_eq!(resolved.teacher_name, "홍길동");
        assert_eq!(resolved.total_questions, 7);
    }

    #[test]
    fn filled_fields_are_kept() {
        let header = HeaderInfo {
            school_name: "한빛고등학교".into(),
            subject: "수학".into(),
            date: "2026-05-01".into(),
            total_questions: 25,
            ..Default::default()
        };
        let resolved = header.resolve(3, day());
        assert_eq!(resolved.school_name, "한빛고등학교");
        assert_eq!(resolved.subject, "수학");
        assert_eq!(resolved.date, "2026-05-01");
        assert_eq!(resolved.total_questions, 25);
    }

    #[test]
    fn deserializes_camel_case_with_missing_fields() {
        let header: HeaderInfo =
            serde_json::from_str(r#"{"schoolName":"한빛고등학교","totalQuestions":10}"#)
                .expect("parse header");
        assert_eq!(header.school_name, "한빛고등학교");
        assert_eq!(header.total_questions, 10);
        assert!(header.subject.is_empty());
    }
}
