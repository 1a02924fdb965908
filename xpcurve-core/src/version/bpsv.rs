//! Pipe-separated tables served by the patch server.
//!
//! ```text
//! Region!STRING:0|BuildConfig!HEX:16|BuildId!DEC:4|VersionsName!String:0
//! ## seqn = 2928530
//! us|0123...|56008|1.15.4.56008
//! ```
//!
//! `##` lines (including `seqn`) are comments and are skipped.

use crate::error::{CurveError, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bpsv {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Bpsv {
    pub fn parse(text: &str) -> Result<Self> {
        let mut out = Bpsv::default();
        let mut have_header = false;
        for (i, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with("##") {
                continue;
            }
            if !have_header {
                out.columns = line
                    .split('|')
                    .map(|c| c.split('!').next().unwrap_or(c).to_string())
                    .collect();
                have_header = true;
                continue;
            }
            let row: Vec<String> = line.split('|').map(str::to_string).collect();
            if row.len() != out.columns.len() {
                return Err(CurveError::Format(format!(
                    "bpsv line {}: got {} fields, expected {}",
                    i + 1,
                    row.len(),
                    out.columns.len()
                )));
            }
            out.rows.push(row);
        }
        if !have_header {
            return Err(CurveError::Format("bpsv document has no header".into()));
        }
        Ok(out)
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Value of `column` in the first row whose `key_column` equals `key`.
    pub fn lookup(&self, key_column: &str, key: &str, column: &str) -> Result<Option<&str>> {
        let k = self
            .column(key_column)
            .ok_or_else(|| CurveError::Format(format!("bpsv has no {key_column} column")))?;
        let c = self
            .column(column)
            .ok_or_else(|| CurveError::Format(format!("bpsv has no {column} column")))?;
        Ok(self
            .rows
            .iter()
            .find(|r| r[k] == key)
            .map(|r| r[c].as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSIONS: &str = "Region!STRING:0|BuildConfig!HEX:16|CDNConfig!HEX:16|KeyRing!HEX:16|BuildId!DEC:4|VersionsName!String:0|ProductConfig!HEX:16\n\
        ## seqn = 2928530\n\
        us|aa|bb||56008|1.15.4.56008|cc\n\
        eu|aa|bb||56008|1.15.4.56008|cc\n\
        cn|dd|ee||55900|1.15.4.55900|ff\n";

    #[test]
    fn parses_header_and_rows() {
        let t = Bpsv::parse(VERSIONS).unwrap();
        assert_eq!(t.columns[4], "BuildId");
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.lookup("Region", "cn", "BuildId").unwrap(), Some("55900"));
        assert_eq!(t.lookup("Region", "kr", "BuildId").unwrap(), None);
    }

    #[test]
    fn missing_column_is_format_error() {
        let t = Bpsv::parse(VERSIONS).unwrap();
        assert!(t.lookup("Region", "us", "Nope").is_err());
    }

    #[test]
    fn ragged_row_is_rejected() {
        let err = Bpsv::parse("A!STRING:0|B!DEC:4\nx|1|2\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn odd_comments_are_skipped() {
        let t = Bpsv::parse("Region!STRING:0|BuildId!DEC:4\n## seqn = soon\n## cdn\nus|56008\n").unwrap();
        assert_eq!(t.lookup("Region", "us", "BuildId").unwrap(), Some("56008"));
    }

    #[test]
    fn comments_only_is_rejected() {
        assert!(Bpsv::parse("## seqn = 1\n").is_err());
    }
}
