//! PDV strategy: one item per file, bucketed by the date in its name

use chrono::{Datelike, NaiveDate, ParseError};
use htmdec_common::events::ResourceType;
use htmdec_common::models::ParentRef;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use super::{ImportContext, ImportItem};
use crate::error::ImportResult;
use crate::hierarchy::ensure_folder;
use crate::sniffer::sniff_mime;

pub const PDV_TAG: &str = "pdv";

static DATE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{8}").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct PdvStrategy;

/// Parse an 8-digit run as a calendar date (`YYYYMMDD`)
pub fn parse_date_run(digits: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(digits, "%Y%m%d")
}

/// Date encoded in a file name, if its first 8-digit run is a valid date
pub fn date_in_name(name: &str) -> Option<NaiveDate> {
    let run = DATE_RUN.find(name)?;
    match parse_date_run(run.as_str()) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(name, digits = run.as_str(), error = %e, "Digit run is not a date");
            None
        }
    }
}

impl ImportItem for PdvStrategy {
    fn import_item(
        &self,
        ctx: &ImportContext<'_>,
        parent: &ParentRef,
        name: &str,
        import_path: &Path,
    ) -> ImportResult<()> {
        let mut parent = *parent;
        if let Some(date) = date_in_name(name) {
            let year = ensure_folder(ctx.store, &parent, &date.year().to_string(), ctx.user)?;
            let day_name = format!("{}{:02}{:02}", date.year(), date.month(), date.day());
            let day = ensure_folder(ctx.store, &year.as_parent(), &day_name, ctx.user)?;
            parent = day.as_parent();
        }

        let item = ctx.tagged_item(&parent, name, PDV_TAG)?;

        let path = import_path.join(name);
        ctx.announce(item.id, ResourceType::Item, &path);
        ctx.offer_file(&item, &path, name, || sniff_mime(&path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_in_name() {
        assert_eq!(
            date_in_name("scan_20230714_01.dat"),
            NaiveDate::from_ymd_opt(2023, 7, 14)
        );
        assert_eq!(date_in_name("readme.txt"), None);
        assert_eq!(date_in_name("99999999_data.dat"), None);
    }

    #[test]
    fn test_only_first_run_is_used() {
        // first run is not a date, the second one would be
        assert_eq!(date_in_name("00000000_20230714.dat"), None);
        assert_eq!(
            date_in_name("20220101_20230714.dat"),
            NaiveDate::from_ymd_opt(2022, 1, 1)
        );
    }

    #[test]
    fn test_longer_digit_runs_use_leading_eight() {
        assert_eq!(
            date_in_name("shot2023071412.dat"),
            NaiveDate::from_ymd_opt(2023, 7, 14)
        );
    }

    #[test]
    fn test_unparseable_run_is_parse_error() {
        assert!(parse_date_run("20231301").is_err());
        assert!(parse_date_run("20230230").is_err());
    }
}
