use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    to_primitive_utc(OffsetDateTime::now_utc())
}

pub(crate) fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Accepts any RFC 3339 timestamp and normalises it to naive UTC for storage.
pub(crate) fn parse_rfc3339_utc(value: &str) -> Option<PrimitiveDateTime> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).ok().map(to_primitive_utc)
}

pub(crate) fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub(crate) fn format_date(value: Date) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| value.to_string())
}

pub(crate) fn current_year_tag() -> String {
    OffsetDateTime::now_utc().year().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Month, Time};

    #[test]
    fn format_primitive_outputs_utc_z() {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        let time = Time::from_hms(10, 20, 30).unwrap();
        assert_eq!(format_primitive(PrimitiveDateTime::new(date, time)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn rfc3339_offsets_are_normalised_to_utc() {
        let parsed = parse_rfc3339_utc("2025-03-04T12:00:00+03:00").expect("timestamp");
        assert_eq!(format_primitive(parsed), "2025-03-04T09:00:00Z");
        assert!(parse_rfc3339_utc("next tuesday").is_none());
    }

    #[test]
    fn dates_round_trip_through_iso_format() {
        let date = parse_date("2025-06-30").expect("date");
        assert_eq!(date, Date::from_calendar_date(2025, Month::June, 30).unwrap());
        assert_eq!(format_date(date), "2025-06-30");
        assert!(parse_date("30/06/2025").is_none());
    }
}
