use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::{debug, warn};
use watchlog_models::WatchEntry;
use crate::months::MonthTable;

/// The watch log that ships with the importer.
pub const BUNDLED_LOG: &str = include_str!("../data/watch_log.txt");

/// Month used when the month name is not in the table.
pub const FALLBACK_MONTH: u32 = 1;

fn year_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}$").expect("valid year header regex"))
}

// Greedy title group: the last "(...)" before the dash is the viewer.
fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)\((.+)\)\s*-\s*(.+)$").expect("valid entry regex"))
}

fn title_cleanup_res() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            // club screening label, e.g. "Leffakerho 2v: The Menu"
            Regex::new(r"(?i)^Leffakerho [0-9]v:\s*").expect("valid series label regex"),
            Regex::new(r"(?i)\s*\(Finnkino IMAX.*\)").expect("valid cinema annotation regex"),
            Regex::new(r"(?i)\s*\(ennakkonäytös.*\)").expect("valid preview annotation regex"),
        ]
    })
}

#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Empty means every viewer is accepted without comment.
    pub known_viewers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unmatched,
    NoYearHeader,
    /// Year and month do not form a calendar date.
    InvalidDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub line: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownMonth {
    pub line_number: usize,
    pub month: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    pub entries: Vec<WatchEntry>,
    pub year_headers: usize,
    pub skipped: Vec<SkippedLine>,
    pub unknown_months: Vec<UnknownMonth>,
    pub unknown_viewers: BTreeSet<String>,
}

impl ParseReport {
    pub fn has_warnings(&self) -> bool {
        !self.skipped.is_empty() || !self.unknown_months.is_empty() || !self.unknown_viewers.is_empty()
    }
}

/// Remove the club label prefix and the cinema/preview annotations from a title.
pub fn clean_title(raw: &str) -> String {
    let mut title = raw.trim().to_string();
    for re in title_cleanup_res() {
        title = re.replace_all(&title, "").into_owned();
    }
    title.trim().to_string()
}

/// Parse the free-text log. Lines that do not fit are skipped and reported, never fatal.
pub fn parse_log(text: &str, months: &MonthTable, options: &ParserOptions) -> ParseReport {
    let mut report = ParseReport::default();
    let mut current_year: Option<i32> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if year_header_re().is_match(line) {
            // four ASCII digits always fit
            current_year = line.parse().ok();
            report.year_headers += 1;
            debug!("Year header {} at line {}", line, line_number);
            continue;
        }

        let Some(caps) = entry_re().captures(line) else {
            warn!("Could not parse line {}: {}", line_number, line);
            report.skipped.push(SkippedLine {
                line_number,
                line: line.to_string(),
                reason: SkipReason::Unmatched,
            });
            continue;
        };

        let Some(year) = current_year else {
            warn!("Line {} comes before any year header, skipping: {}", line_number, line);
            report.skipped.push(SkippedLine {
                line_number,
                line: line.to_string(),
                reason: SkipReason::NoYearHeader,
            });
            continue;
        };

        let title = clean_title(&caps[1]);
        let viewer = caps[2].trim().to_string();
        let month_name = caps[3].trim();

        let month = match months.lookup(month_name) {
            Some(month) => month,
            None => {
                warn!(
                    "Unknown month '{}' on line {}, defaulting to {}",
                    month_name, line_number, FALLBACK_MONTH
                );
                report.unknown_months.push(UnknownMonth {
                    line_number,
                    month: month_name.to_string(),
                });
                FALLBACK_MONTH
            }
        };

        if !options.known_viewers.is_empty()
            && !options.known_viewers.iter().any(|v| v == &viewer)
            && report.unknown_viewers.insert(viewer.clone())
        {
            warn!("Unknown viewer '{}' first seen on line {}", viewer, line_number);
        }

        match WatchEntry::new(title, viewer, year, month) {
            Some(entry) => report.entries.push(entry),
            None => {
                warn!("Line {} has no valid date ({}-{}), skipping: {}", line_number, year, month, line);
                report.skipped.push(SkippedLine {
                    line_number,
                    line: line.to_string(),
                    reason: SkipReason::InvalidDate,
                });
            }
        }
    }

    debug!(
        "Parsed {} entries under {} year header(s), {} line(s) skipped",
        report.entries.len(),
        report.year_headers,
        report.skipped.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParseReport {
        parse_log(text, &MonthTable::finnish(), &ParserOptions::default())
    }

    #[test]
    fn test_parse_basic_entry() {
        let report = parse("2021\n\nFast & furious (Tomi) - Tammikuu\n");
        assert_eq!(report.entries.len(), 1);

        let entry = &report.entries[0];
        assert_eq!(entry.title, "Fast & furious");
        assert_eq!(entry.viewer, "Tomi");
        assert_eq!(entry.year, 2021);
        assert_eq!(entry.month, 1);
        assert_eq!(entry.watch_date.to_string(), "2021-01-01");
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_year_header_carries_forward() {
        let report = parse(
            "2021\nSeven (Mikkis) - Helmikuu\nKlaus (Mikkis) - Joulukuu\n2022\nAvatar (Mikkis) - Helmikuu\n",
        );
        let years: Vec<i32> = report.entries.iter().map(|e| e.year).collect();
        assert_eq!(years, vec![2021, 2021, 2022]);
        assert_eq!(report.year_headers, 2);
    }

    #[test]
    fn test_tolerates_spacing_around_dash() {
        let report = parse(
            "2021\nFantastic Mr. Fox (Mikkis) -Maaliskuu\nIhmeotukset: Dumbledoren salaisuudet (Aino)- Kesäkuu\nThe Terminal (Tomi) - Joulukuu   \n",
        );
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[0].month, 3);
        assert_eq!(report.entries[1].title, "Ihmeotukset: Dumbledoren salaisuudet");
        assert_eq!(report.entries[1].month, 6);
        assert_eq!(report.entries[2].title, "The Terminal");
        assert_eq!(report.entries[2].month, 12);
    }

    #[test]
    fn test_dash_inside_title() {
        let report = parse("2021\nRita Hayworth - avain pakoon (Mari) - Marraskuu\n");
        assert_eq!(report.entries[0].title, "Rita Hayworth - avain pakoon");
        assert_eq!(report.entries[0].viewer, "Mari");
    }

    #[test]
    fn test_cinema_annotation_removed() {
        let report = parse("2022\nBlack panther (Finnkino IMAX) - Marraskuu\n");
        assert_eq!(report.entries[0].title, "Black panther");
        assert_eq!(report.entries[0].month, 11);
    }

    #[test]
    fn test_annotation_before_viewer_is_cleaned() {
        let report = parse("2023\nThe Batman (Finnkino IMAX ennakkonäytös) (Tomi) - Maaliskuu\n");
        assert_eq!(report.entries[0].title, "The Batman");
        assert_eq!(report.entries[0].viewer, "Tomi");
    }

    #[test]
    fn test_clean_title_rules() {
        assert_eq!(clean_title("Leffakerho 1v: Wayne’s world"), "Wayne’s world");
        assert_eq!(clean_title("leffakerho 3v:The Family Plan"), "The Family Plan");
        assert_eq!(clean_title("The guardians of the galaxy vol. 3 (Finnkino IMAX)"), "The guardians of the galaxy vol. 3");
        assert_eq!(clean_title("Dune (finnkino imax 3D)"), "Dune");
        assert_eq!(clean_title("Oppenheimer (ennakkonäytös)"), "Oppenheimer");
    }

    #[test]
    fn test_clean_title_idempotent() {
        for title in ["Fast & furious", "Mr. & Mrs. Smith", "\"42\"", "Kiinni jäit!?", "Leffakerho 2v: The Menu"] {
            let once = clean_title(title);
            assert_eq!(clean_title(&once), once);
        }
        assert_eq!(clean_title("Seven"), "Seven");
    }

    #[test]
    fn test_unmatched_line_is_skipped() {
        let report = parse("2024\nWill Hunting - syntynyt neroksi - (Mari) Huhtikuu\nRoad House (Tomi) - Huhtikuu\n");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line_number, 2);
        assert_eq!(report.skipped[0].reason, SkipReason::Unmatched);
    }

    #[test]
    fn test_unknown_month_defaults_to_january() {
        let report = parse("2021\nSeven (Mikkis) - Smarch\n");
        assert_eq!(report.entries[0].month, FALLBACK_MONTH);
        assert_eq!(report.unknown_months.len(), 1);
        assert_eq!(report.unknown_months[0].month, "Smarch");
        assert!(report.has_warnings());
    }

    #[test]
    fn test_entry_before_year_header() {
        let report = parse("Seven (Mikkis) - Helmikuu\n2021\nHercules (Aino) - Helmikuu\n");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::NoYearHeader);
    }

    #[test]
    fn test_unknown_viewers_reported_once() {
        let options = ParserOptions {
            known_viewers: vec!["Tomi".to_string(), "Mari".to_string()],
        };
        let report = parse_log(
            "2023\nTetris (Mikkis) - Huhtikuu\nM3gan (Mikkis) - Lokakuu\nHair (Mari) - Tammikuu\n",
            &MonthTable::finnish(),
            &options,
        );
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.unknown_viewers.len(), 1);
        assert!(report.unknown_viewers.contains("Mikkis"));
    }

    #[test]
    fn test_english_locale() {
        let report = parse_log("2020\nHeat (Ann) - March\n", &MonthTable::english(), &ParserOptions::default());
        assert_eq!(report.entries[0].month, 3);
    }

    #[test]
    fn test_bundled_log() {
        let report = parse(BUNDLED_LOG);
        assert_eq!(report.year_headers, 6);
        assert_eq!(report.entries.len(), 162);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.unknown_months.is_empty());
        assert!(report.entries.iter().all(|e| (1..=12).contains(&e.month)));
        assert!(report.entries.iter().all(|e| (2021..=2026).contains(&e.year)));

        let wayne = report.entries.iter().find(|e| e.title == "Wayne’s world").unwrap();
        assert_eq!((wayne.year, wayne.month), (2022, 1));

        let last = report.entries.last().unwrap();
        assert_eq!(last.title, "Billy Elliot");
        assert_eq!((last.year, last.month), (2026, 1));
    }
}
