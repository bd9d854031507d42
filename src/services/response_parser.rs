//! 生成结果解析
//!
//! 按三个分节标记把模型输出拆成 [`ParsedDocument`]。
//!
//! 规则：
//! - 同时存在简介标记和 README 标记时按标记切分，各节内容去掉首尾空白
//! - 任一标记缺失时，整段原文作为 README，其余两项为空
//! - 每个标记只认第一次出现的位置；一节的内容从该标记开始，到按位置排列的下一个标记为止
//! - 与已认领标记重叠的匹配不作为分节边界
//!
//! 宽松解析永不失败，结构问题通过 [`SectionIssue`] 报告；[`ParseReport::into_strict`] 把任何问题视为错误。

use serde::Serialize;
use std::fmt;

use super::prompts::{DESCRIPTION_MARKER, README_MARKER, RESUME_BULLET_MARKER};
use super::types::ParsedDocument;

/// 分节种类，按期望出现的顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Description,
    ResumeBullet,
    Readme,
}

impl Section {
    const ORDERED: [Section; 3] = [Section::Description, Section::ResumeBullet, Section::Readme];

    pub fn marker(self) -> &'static str {
        match self {
            Section::Description => DESCRIPTION_MARKER,
            Section::ResumeBullet => RESUME_BULLET_MARKER,
            Section::Readme => README_MARKER,
        }
    }
}

/// 输出结构问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionIssue {
    /// 标记缺失
    Missing { section: Section },
    /// 标记出现多次（只有第一次生效）
    Duplicate { section: Section, count: usize },
    /// 标记出现在本应在它之后的标记前面
    OutOfOrder { section: Section },
    /// 标记只以与其他标记重叠的形式出现，不作为分节边界
    Overlapping { section: Section },
}

impl fmt::Display for SectionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionIssue::Missing { section } => write!(f, "missing marker `{}`", section.marker()),
            SectionIssue::Duplicate { section, count } => {
                write!(f, "marker `{}` appears {} times", section.marker(), count)
            }
            SectionIssue::OutOfOrder { section } => {
                write!(f, "marker `{}` is out of order", section.marker())
            }
            SectionIssue::Overlapping { section } => {
                write!(f, "marker `{}` only appears overlapping another marker", section.marker())
            }
        }
    }
}

/// 解析报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub document: ParsedDocument,
    pub issues: Vec<SectionIssue>,
    /// 是否退化为"整段原文作为 README"
    pub fallback: bool,
}

impl ParseReport {
    /// 严格模式：标记缺失、重复或乱序都会报错
    pub fn into_strict(self) -> Result<Self, ParseError> {
        if self.issues.is_empty() {
            Ok(self)
        } else {
            Err(ParseError {
                issues: self.issues,
            })
        }
    }
}

/// 严格解析错误
#[derive(Debug, thiserror::Error)]
#[error("模型输出格式不符合要求: {}", join_issues(.issues))]
pub struct ParseError {
    pub issues: Vec<SectionIssue>,
}

fn join_issues(issues: &[SectionIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 宽松解析并收集结构问题
pub fn parse_sections(text: &str) -> ParseReport {
    let positions = locate_markers(text);
    let issues = collect_issues(text, &positions);

    let position_of = |section: Section| {
        positions
            .iter()
            .find(|(s, _)| *s == section)
            .and_then(|(_, pos)| *pos)
    };

    if position_of(Section::Description).is_none() || position_of(Section::Readme).is_none() {
        return ParseReport {
            document: ParsedDocument {
                readme: text.to_string(),
                ..Default::default()
            },
            issues,
            fallback: true,
        };
    }

    let mut present: Vec<(Section, usize)> = positions
        .iter()
        .filter_map(|(s, pos)| pos.map(|p| (*s, p)))
        .collect();
    present.sort_by_key(|(_, pos)| *pos);

    let mut document = ParsedDocument::default();
    for (idx, (section, pos)) in present.iter().enumerate() {
        let start = pos + section.marker().len();
        // 标记互不重叠，下一个标记不会早于本节起点
        let end = present
            .get(idx + 1)
            .map_or(text.len(), |(_, next)| *next)
            .max(start);
        let body = text[start..end].trim().to_string();
        match section {
            Section::Description => document.description = body,
            Section::ResumeBullet => document.resume_bullet = body,
            Section::Readme => document.readme = body,
        }
    }

    ParseReport {
        document,
        issues,
        fallback: false,
    }
}

/// 按 [`Section::ORDERED`] 依次定位每个标记的第一次出现
///
/// 与先前已认领的标记区间重叠的匹配会被跳过
fn locate_markers(text: &str) -> Vec<(Section, Option<usize>)> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();

    Section::ORDERED
        .iter()
        .map(|&section| {
            let len = section.marker().len();
            let pos = text
                .match_indices(section.marker())
                .map(|(p, _)| p)
                .find(|&p| claimed.iter().all(|&(start, end)| p + len <= start || p >= end));
            if let Some(p) = pos {
                claimed.push((p, p + len));
            }
            (section, pos)
        })
        .collect()
}

fn collect_issues(text: &str, positions: &[(Section, Option<usize>)]) -> Vec<SectionIssue> {
    let mut issues = Vec::new();
    let mut last_pos: Option<usize> = None;

    for &(section, pos) in positions {
        let count = text.matches(section.marker()).count();
        match (count, pos) {
            (0, _) => issues.push(SectionIssue::Missing { section }),
            (_, None) => issues.push(SectionIssue::Overlapping { section }),
            (1, _) => {}
            _ => issues.push(SectionIssue::Duplicate { section, count }),
        }

        if let Some(pos) = pos {
            if last_pos.is_some_and(|last| pos < last) {
                issues.push(SectionIssue::OutOfOrder { section });
            }
            last_pos = Some(last_pos.map_or(pos, |last| last.max(pos)));
        }
    }

    issues
}
