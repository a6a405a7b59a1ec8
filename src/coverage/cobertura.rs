//! Cobertura XML format parser

use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{CoverageData, CoverageSummary, FileCoverage, Metric};

#[derive(Default)]
struct ClassCounts {
    lines_covered: u64,
    lines_total: u64,
    methods_covered: u64,
    methods_total: u64,
    branches_covered: u64,
    branches_total: u64,
}

impl ClassCounts {
    fn summary(&self) -> CoverageSummary {
        let lines = Metric::new(self.lines_covered, self.lines_total);
        CoverageSummary {
            lines,
            statements: lines,
            functions: Metric::new(self.methods_covered, self.methods_total),
            branches: Metric::new(self.branches_covered, self.branches_total),
        }
    }
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Parse "50% (1/2)" into (covered, total)
fn parse_condition_coverage(value: &str) -> Option<(u64, u64)> {
    let start = value.find('(')?;
    let end = value[start..].find(')')? + start;
    let (covered, total) = value[start + 1..end].split_once('/')?;
    Some((covered.trim().parse().ok()?, total.trim().parse().ok()?))
}

/// Walks `<class>` elements, collecting one file per class
#[derive(Default)]
struct ClassWalker {
    files: Vec<FileCoverage>,
    current_file: Option<String>,
    counts: ClassCounts,
    // Lines nested in <method> repeat the class lines
    in_method: bool,
    method_hit: bool,
}

impl ClassWalker {
    fn element(&mut self, e: &BytesStart, is_empty: bool) {
        match e.name().as_ref() {
            b"class" => {
                if let Some(filename) = attr(e, b"filename").filter(|f| !f.is_empty()) {
                    if is_empty {
                        // <class/> has no lines and no closing tag
                        self.files.push(FileCoverage {
                            path: filename,
                            summary: ClassCounts::default().summary(),
                        });
                    } else {
                        self.current_file = Some(filename);
                        self.counts = ClassCounts::default();
                    }
                }
            }
            b"method" if self.current_file.is_some() => {
                self.counts.methods_total += 1;
                if is_empty {
                    let rate = attr(e, b"line-rate")
                        .and_then(|r| r.parse::<f64>().ok())
                        .unwrap_or(0.0);
                    if rate > 0.0 {
                        self.counts.methods_covered += 1;
                    }
                } else {
                    self.in_method = true;
                    self.method_hit = false;
                }
            }
            b"line" if self.current_file.is_some() => {
                let hits = attr(e, b"hits")
                    .and_then(|h| h.parse::<u64>().ok())
                    .unwrap_or(0);

                if self.in_method {
                    self.method_hit |= hits > 0;
                    return;
                }

                self.counts.lines_total += 1;
                if hits > 0 {
                    self.counts.lines_covered += 1;
                }

                if attr(e, b"branch").as_deref() == Some("true") {
                    if let Some((covered, total)) =
                        attr(e, b"condition-coverage").and_then(|v| parse_condition_coverage(&v))
                    {
                        let counts = &mut self.counts;
                        counts.branches_covered = counts.branches_covered.saturating_add(covered);
                        counts.branches_total = counts.branches_total.saturating_add(total);
                    }
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"method" if self.in_method => {
                if self.method_hit {
                    self.counts.methods_covered += 1;
                }
                self.in_method = false;
            }
            b"class" => {
                if let Some(path) = self.current_file.take() {
                    self.files.push(FileCoverage {
                        path,
                        summary: self.counts.summary(),
                    });
                }
            }
            _ => {}
        }
    }
}

/// Parse Cobertura XML content from a string
pub fn parse_cobertura_string(content: &str) -> Result<CoverageData> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut walker = ClassWalker::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => walker.element(e, false),
            Ok(Event::Empty(ref e)) => walker.element(e, true),
            Ok(Event::End(ref e)) => walker.end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!(
                "Error parsing Cobertura XML at position {}: {}",
                reader.buffer_position(),
                e
            ),
            _ => {}
        }
        buf.clear();
    }

    Ok(CoverageData::from_files(walker.files))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cobertura() {
        let xml = r#"<?xml version="1.0"?>
<coverage line-rate="0.8" branch-rate="0.5" lines-covered="80" lines-valid="100">
    <packages>
        <package name="src">
            <classes>
                <class name="main" filename="src/main.rs" line-rate="0.75" branch-rate="0.5">
                    <methods>
                        <method name="main" signature="()V" line-rate="1.0">
                            <lines>
                                <line number="1" hits="1"/>
                            </lines>
                        </method>
                        <method name="unused" signature="()V" line-rate="0.0">
                            <lines>
                                <line number="3" hits="0"/>
                            </lines>
                        </method>
                    </methods>
                    <lines>
                        <line number="1" hits="1"/>
                        <line number="2" hits="1" branch="true" condition-coverage="50% (1/2)"/>
                        <line number="3" hits="0"/>
                        <line number="4" hits="1"/>
                    </lines>
                </class>
                <class name="util" filename="src/util.rs" line-rate="0">
                    <methods/>
                    <lines>
                        <line number="1" hits="0"/>
                    </lines>
                </class>
            </classes>
        </package>
    </packages>
</coverage>"#;

        let data = parse_cobertura_string(xml).unwrap();

        assert_eq!(data.files.len(), 2);
        assert_eq!(data.files[0].path, "src/main.rs");
        assert_eq!(data.files[0].summary.lines.total, 4);
        assert_eq!(data.files[0].summary.lines.covered, 3);
        assert_eq!(data.files[0].summary.functions.covered, 1);
        assert_eq!(data.files[0].summary.functions.total, 2);

        assert_eq!(data.total.lines.pct, 60.0);
        assert_eq!(data.total.branches.pct, 50.0);
        assert_eq!(data.total.functions.pct, 50.0);
    }

    #[test]
    fn test_condition_coverage() {
        assert_eq!(parse_condition_coverage("50% (1/2)"), Some((1, 2)));
        assert_eq!(parse_condition_coverage("100% (4/4)"), Some((4, 4)));
        assert_eq!(parse_condition_coverage("50%"), None);
    }

    #[test]
    fn test_self_closing_class() {
        let xml = r#"<coverage><classes>
<class name="empty" filename="src/empty.rs"/>
<line number="1" hits="1"/>
<class name="lib" filename="src/lib.rs"><lines><line number="1" hits="0"/></lines></class>
</classes></coverage>"#;

        let data = parse_cobertura_string(xml).unwrap();

        assert_eq!(data.files.len(), 2);
        assert_eq!(data.files[0].path, "src/empty.rs");
        assert_eq!(data.files[0].summary.lines.total, 0);
        assert_eq!(data.total.lines.total, 1);
        assert_eq!(data.total.lines.covered, 0);
    }

    #[test]
    fn test_large_condition_coverage_saturates() {
        let xml = r#"<coverage><class filename="a.rs"><lines>
<line number="1" hits="1" branch="true" condition-coverage="100% (18446744073709551615/18446744073709551615)"/>
<line number="2" hits="1" branch="true" condition-coverage="50% (1/2)"/>
</lines></class></coverage>"#;

        let data = parse_cobertura_string(xml).unwrap();
        assert_eq!(data.total.branches.total, u64::MAX);
        assert_eq!(data.total.branches.pct, 100.0);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(parse_cobertura_string("<coverage><class filename=\"a\"></coverage>").is_err());
    }
}
