//! Minimal CLI parsing for the daily run.

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;

#[derive(Debug, Default)]
pub struct CliOptions {
    /// Requested picture date; None means today
    pub date: Option<NaiveDate>,
    /// Populate the cache but leave the desktop alone
    pub no_wallpaper: bool,
}

impl CliOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse(std::env::args().skip(1))
    }

    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut options = CliOptions::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--no-wallpaper" => options.no_wallpaper = true,
                "--date" => {
                    let Some(value) = args.next() else {
                        bail!("--date requires a value (YYYY-MM-DD)");
                    };
                    options.set_date(parse_date(&value)?)?;
                }
                _ if arg.starts_with("--date=") => {
                    if let Some((_, value)) = arg.split_once('=') {
                        options.set_date(parse_date(value)?)?;
                    }
                }
                _ if arg.starts_with('-') => bail!("Unknown option: {}", arg),
                _ => options.set_date(parse_date(&arg)?)?,
            }
        }
        Ok(options)
    }

    fn set_date(&mut self, date: NaiveDate) -> Result<()> {
        if self.date.is_some() {
            bail!("A picture date was given more than once");
        }
        self.date = Some(date);
        Ok(())
    }

    /// Apply the default and bounds to the requested date
    ///
    /// The API has nothing for future dates, and nothing before the first
    /// APOD publication.
    pub fn resolve_target_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        let date = self.date.unwrap_or(today);
        if date > today {
            bail!("APOD date cannot be in the future");
        }
        if date < first_apod_date() {
            bail!("APOD has no pictures before {}", first_apod_date());
        }
        Ok(date)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{}'; use YYYY-MM-DD", s))
}

fn first_apod_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).expect("valid date")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::vec::IntoIter<String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_args() {
        let options = CliOptions::parse(args(&[])).unwrap();
        assert_eq!(options.date, None);
        assert!(!options.no_wallpaper);
    }

    #[test]
    fn test_positional_date() {
        let options = CliOptions::parse(args(&["2024-03-01"])).unwrap();
        assert_eq!(options.date, Some(day(2024, 3, 1)));
    }

    #[test]
    fn test_date_flag_forms() {
        let options = CliOptions::parse(args(&["--date", "2024-03-01"])).unwrap();
        assert_eq!(options.date, Some(day(2024, 3, 1)));

        let options = CliOptions::parse(args(&["--date=2024-03-01"])).unwrap();
        assert_eq!(options.date, Some(day(2024, 3, 1)));
    }

    #[test]
    fn test_no_wallpaper_flag() {
        let options = CliOptions::parse(args(&["--no-wallpaper", "2024-03-01"])).unwrap();
        assert!(options.no_wallpaper);
        assert_eq!(options.date, Some(day(2024, 3, 1)));
    }

    #[test]
    fn test_malformed_date() {
        assert!(CliOptions::parse(args(&["03/01/2024"])).is_err());
        assert!(CliOptions::parse(args(&["2024-13-01"])).is_err());
        assert!(CliOptions::parse(args(&["--date"])).is_err());
    }

    #[test]
    fn test_unknown_flag() {
        assert!(CliOptions::parse(args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_duplicate_date() {
        assert!(CliOptions::parse(args(&["2024-03-01", "2024-03-02"])).is_err());
    }

    #[test]
    fn test_resolve_defaults_to_today() {
        let today = day(2024, 3, 1);
        let options = CliOptions::default();
        assert_eq!(options.resolve_target_date(today).unwrap(), today);
    }

    #[test]
    fn test_resolve_rejects_future() {
        let today = day(2024, 3, 1);
        let options = CliOptions {
            date: Some(day(2024, 3, 2)),
            ..Default::default()
        };
        assert!(options.resolve_target_date(today).is_err());
    }

    #[test]
    fn test_resolve_rejects_pre_apod_dates() {
        let today = day(2024, 3, 1);
        let options = CliOptions {
            date: Some(day(1995, 6, 15)),
            ..Default::default()
        };
        assert!(options.resolve_target_date(today).is_err());

        let options = CliOptions {
            date: Some(day(1995, 6, 16)),
            ..Default::default()
        };
        assert_eq!(options.resolve_target_date(today).unwrap(), day(1995, 6, 16));
    }
}
