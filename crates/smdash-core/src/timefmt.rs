//! Timestamp parsing and locale-aware time phrases.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::ParseError;

/// Languages with native phrasing. Any other configured tag uses the
/// compact numeric fallback (`hace 5min`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Es,
    En,
}

impl Locale {
    /// Match a language tag such as `es`, `en-US` or `es_AR`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "es" => Some(Locale::Es),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Parse a daemon timestamp.
///
/// Accepts RFC 3339, RFC 2822, bare dates (UTC midnight) and the common
/// naive layouts, which are read as local time.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ParseError(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Minute,
    Hour,
    Day,
}

/// Human phrase for how long ago `then` was.
///
/// `None` yields the "no recent alerts" sentinel; instants in the future
/// yield "just now".
pub fn format_relative(
    then: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    locale: Option<Locale>,
) -> String {
    let Some(then) = then else {
        return no_recent_alerts(locale).to_string();
    };

    let diff_ms = (now - then).num_milliseconds();
    if diff_ms < 0 {
        return match locale {
            Some(Locale::En) => "just now",
            _ => "Hace un momento",
        }
        .to_string();
    }

    let diff_sec = (diff_ms as f64 / 1000.0).round();
    if diff_sec < 60.0 {
        return match locale {
            Some(Locale::En) => "now",
            _ => "Ahora",
        }
        .to_string();
    }

    let (n, unit) = if diff_sec < 3600.0 {
        ((diff_sec / 60.0).round() as u64, Unit::Minute)
    } else if diff_sec < 86400.0 {
        ((diff_sec / 3600.0).round() as u64, Unit::Hour)
    } else {
        ((diff_sec / 86400.0).round() as u64, Unit::Day)
    };

    match locale {
        Some(Locale::Es) => spanish(n, unit),
        Some(Locale::En) => english(n, unit),
        None => {
            let suffix = match unit {
                Unit::Minute => "min",
                Unit::Hour => "h",
                Unit::Day => "d",
            };
            format!("hace {n}{suffix}")
        }
    }
}

fn spanish(n: u64, unit: Unit) -> String {
    match (unit, n) {
        (Unit::Day, 1) => "ayer".to_string(),
        (Unit::Day, _) => format!("hace {n} días"),
        (Unit::Hour, 1) => "hace 1 hora".to_string(),
        (Unit::Hour, _) => format!("hace {n} horas"),
        (Unit::Minute, 1) => "hace 1 minuto".to_string(),
        (Unit::Minute, _) => format!("hace {n} minutos"),
    }
}

fn english(n: u64, unit: Unit) -> String {
    match (unit, n) {
        (Unit::Day, 1) => "yesterday".to_string(),
        (Unit::Day, _) => format!("{n} days ago"),
        (Unit::Hour, 1) => "1 hour ago".to_string(),
        (Unit::Hour, _) => format!("{n} hours ago"),
        (Unit::Minute, 1) => "1 minute ago".to_string(),
        (Unit::Minute, _) => format!("{n} minutes ago"),
    }
}

/// Sentinel shown when there is no alert to measure from.
pub fn no_recent_alerts(locale: Option<Locale>) -> &'static str {
    match locale {
        Some(Locale::En) => "No recent alerts",
        _ => "Sin alertas recientes",
    }
}

/// Local wall-clock rendering for the alert table. Unparseable input is
/// returned verbatim.
pub fn format_wall_clock(raw: &str, locale: Option<Locale>) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_timestamp(raw) {
        Ok(dt) => {
            let format = match locale {
                Some(Locale::En) => "%Y-%m-%d %H:%M:%S",
                _ => "%d/%m/%Y %H:%M:%S",
            };
            dt.with_timezone(&Local).format(format).to_string()
        }
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(Locale::from_tag("es"), Some(Locale::Es));
        assert_eq!(Locale::from_tag("es-AR"), Some(Locale::Es));
        assert_eq!(Locale::from_tag("EN_us"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_parse_rfc3339_and_rfc2822() {
        let a = at("2024-01-01T00:05:00Z");
        let b = at("2024-01-01T01:05:00+01:00");
        let c = at("Mon, 01 Jan 2024 00:05:00 +0000");
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_parse_naive_is_local() {
        let parsed = at("2024-03-10 12:00:00");
        let expected = Local
            .from_local_datetime(
                &NaiveDateTime::parse_from_str("2024-03-10 12:00:00", "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
            )
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, expected);
        assert!(parse_timestamp("2024/03/10 12:00:00").is_ok());
    }

    #[test]
    fn test_parse_bare_date_is_utc_midnight() {
        assert_eq!(at("2024-01-01"), at("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_timestamp("yesterday-ish"),
            Err(ParseError("yesterday-ish".to_string()))
        );
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_relative_buckets_es() {
        let now = at("2024-01-10T12:00:00Z");
        let es = Some(Locale::Es);
        assert_eq!(format_relative(None, now, es), "Sin alertas recientes");
        assert_eq!(
            format_relative(Some(now + Duration::seconds(5)), now, es),
            "Hace un momento"
        );
        assert_eq!(format_relative(Some(now), now, es), "Ahora");
        assert_eq!(
            format_relative(Some(now - Duration::seconds(59)), now, es),
            "Ahora"
        );
        assert_eq!(
            format_relative(Some(now - Duration::seconds(60)), now, es),
            "hace 1 minuto"
        );
        assert_eq!(
            format_relative(Some(now - Duration::minutes(5)), now, es),
            "hace 5 minutos"
        );
        assert_eq!(
            format_relative(Some(now - Duration::hours(1)), now, es),
            "hace 1 hora"
        );
        assert_eq!(
            format_relative(Some(now - Duration::hours(3)), now, es),
            "hace 3 horas"
        );
        assert_eq!(
            format_relative(Some(now - Duration::days(1)), now, es),
            "ayer"
        );
        assert_eq!(
            format_relative(Some(now - Duration::days(4)), now, es),
            "hace 4 días"
        );
    }

    #[test]
    fn test_relative_buckets_en() {
        let now = at("2024-01-10T12:00:00Z");
        let en = Some(Locale::En);
        assert_eq!(format_relative(None, now, en), "No recent alerts");
        assert_eq!(
            format_relative(Some(now + Duration::minutes(1)), now, en),
            "just now"
        );
        assert_eq!(format_relative(Some(now), now, en), "now");
        assert_eq!(
            format_relative(Some(now - Duration::minutes(1)), now, en),
            "1 minute ago"
        );
        assert_eq!(
            format_relative(Some(now - Duration::hours(2)), now, en),
            "2 hours ago"
        );
        assert_eq!(
            format_relative(Some(now - Duration::days(1)), now, en),
            "yesterday"
        );
        assert_eq!(
            format_relative(Some(now - Duration::days(30)), now, en),
            "30 days ago"
        );
    }

    #[test]
    fn test_relative_rounds() {
        let now = at("2024-01-10T12:00:00Z");
        // 89 s rounds to 1 minute, 90 s to 2.
        assert_eq!(
            format_relative(Some(now - Duration::seconds(89)), now, Some(Locale::En)),
            "1 minute ago"
        );
        assert_eq!(
            format_relative(Some(now - Duration::seconds(90)), now, Some(Locale::En)),
            "2 minutes ago"
        );
        // 36 h rounds to 2 days.
        assert_eq!(
            format_relative(Some(now - Duration::hours(36)), now, Some(Locale::En)),
            "2 days ago"
        );
    }

    #[test]
    fn test_relative_numeric_fallback() {
        let now = at("2024-01-10T12:00:00Z");
        assert_eq!(
            format_relative(Some(now - Duration::minutes(5)), now, None),
            "hace 5min"
        );
        assert_eq!(
            format_relative(Some(now - Duration::hours(2)), now, None),
            "hace 2h"
        );
        assert_eq!(
            format_relative(Some(now - Duration::days(1)), now, None),
            "hace 1d"
        );
        assert_eq!(format_relative(Some(now), now, None), "Ahora");
    }

    #[test]
    fn test_wall_clock() {
        let raw = "2024-01-01T00:05:00Z";
        let local = at(raw).with_timezone(&Local);
        assert_eq!(
            format_wall_clock(raw, Some(Locale::Es)),
            local.format("%d/%m/%Y %H:%M:%S").to_string()
        );
        assert_eq!(
            format_wall_clock(raw, Some(Locale::En)),
            local.format("%Y-%m-%d %H:%M:%S").to_string()
        );
        assert_eq!(format_wall_clock("soon", Some(Locale::Es)), "soon");
        assert_eq!(format_wall_clock("", None), "");
    }
}
