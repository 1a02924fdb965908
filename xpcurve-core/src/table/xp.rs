//! Parser for the flat `gametables/xp.txt` table.

use crate::domain::XpRecord;
use crate::error::{CurveError, Result};
use std::collections::BTreeMap;

pub const XP_HEADER: &str = "Level\tTotal\tPerKill\tJunk\tStats\tDivisor";
pub const XP_COLUMNS: usize = 6;
/// `Total` values at or above this mark levels the client cannot reach.
pub const CAPPED_TOTAL: i64 = 99_999_999;

#[derive(Clone, Debug, Default)]
pub struct XpTable {
    pub by_level: BTreeMap<u32, XpRecord>,
    /// Lowest level whose total hits [`CAPPED_TOTAL`]; `None` when no level does.
    pub level_cap: Option<u32>,
}

impl XpTable {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut lines = raw
            .split('\n')
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        match lines.next() {
            Some((_, header)) if header == XP_HEADER => {}
            Some((n, _)) => {
                return Err(CurveError::Format(format!(
                    "unexpected header in xp table (line {n})"
                )));
            }
            None => return Err(CurveError::Format("xp table is empty".into())),
        }

        let mut table = XpTable::default();
        for (n, line) in lines {
            let rec = parse_line(n, line)?;
            if rec.total >= CAPPED_TOTAL && table.level_cap.is_none_or(|cap| rec.level < cap) {
                table.level_cap = Some(rec.level);
            }
            table.by_level.insert(rec.level, rec);
        }
        Ok(table)
    }

    pub fn get(&self, level: u32) -> Option<&XpRecord> {
        self.by_level.get(&level)
    }
}

fn parse_line(n: usize, line: &str) -> Result<XpRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != XP_COLUMNS {
        return Err(CurveError::Format(format!(
            "unexpected number of columns in xp table line {n}: got {}, expected {XP_COLUMNS}",
            fields.len()
        )));
    }
    let int = |idx: usize| -> Result<i64> {
        fields[idx].trim().parse::<i64>().map_err(|e| {
            CurveError::Format(format!(
                "xp table line {n} column {}: {:?} is not an integer ({e})",
                idx + 1,
                fields[idx]
            ))
        })
    };
    let level = u32::try_from(int(0)?)
        .ok()
        .filter(|l| *l > 0)
        .ok_or_else(|| CurveError::Format(format!("xp table line {n}: level must be positive")))?;
    Ok(XpRecord {
        level,
        total: int(1)?,
        per_kill: int(2)?,
        junk: int(3)?,
        stats: int(4)?,
        divisor: int(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(u32, i64)]) -> String {
        let mut s = format!("{XP_HEADER}\n");
        for (lvl, total) in rows {
            s.push_str(&format!("{lvl}\t{total}\t0\t0\t0\t1\n"));
        }
        s
    }

    #[test]
    fn parses_rows_and_cap() {
        let t = XpTable::parse(&table(&[(1, 400), (2, 900), (3, 99_999_999), (4, 99_999_999)]))
            .unwrap();
        assert_eq!(t.by_level.len(), 4);
        assert_eq!(t.get(2).unwrap().total, 900);
        assert_eq!(t.get(2).unwrap().divisor, 1);
        assert_eq!(t.level_cap, Some(3));
    }

    #[test]
    fn cap_is_smallest_level_even_out_of_order() {
        let t = XpTable::parse(&table(&[(1, 400), (9, 99_999_999), (5, 123_456_789)])).unwrap();
        assert_eq!(t.level_cap, Some(5));
    }

    #[test]
    fn no_capped_level_means_unbounded() {
        let t = XpTable::parse(&table(&[(1, 400), (2, 900)])).unwrap();
        assert_eq!(t.level_cap, None);
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let raw = format!("\r\n{XP_HEADER}\r\n\r\n1\t400\t0\t0\t0\t1\r\n  \n");
        let t = XpTable::parse(&raw).unwrap();
        assert_eq!(t.by_level.len(), 1);
    }

    #[test]
    fn header_mismatch_is_rejected() {
        let raw = "Level\tTotal\tPerKill\tJunk\tStats\n1\t400\t0\t0\t0\t1\n";
        assert!(matches!(XpTable::parse(raw), Err(CurveError::Format(_))));
        let raw = "Level Total\tPerKill\tJunk\tStats\tDivisor\n";
        assert!(matches!(XpTable::parse(raw), Err(CurveError::Format(_))));
    }

    #[test]
    fn wrong_field_count_names_line() {
        let raw = format!("{XP_HEADER}\n1\t400\t0\t0\t0\t1\n2\t900\t0\n");
        let err = XpTable::parse(&raw).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn non_integer_field_is_rejected() {
        let raw = format!("{XP_HEADER}\n1\tabc\t0\t0\t0\t1\n");
        let err = XpTable::parse(&raw).unwrap_err();
        assert!(matches!(err, CurveError::Format(_)));
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(XpTable::parse("\n \n").is_err());
    }
}
