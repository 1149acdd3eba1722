use chrono::NaiveDateTime;

/// Prices render the Brazilian way: "R$ 50,00".
pub fn brl(value: &f64) -> askama::Result<String> {
    Ok(format!("R$ {:.2}", value).replace('.', ","))
}

pub fn hhmm(value: &NaiveDateTime) -> askama::Result<String> {
    Ok(value.format("%H:%M").to_string())
}

pub fn date_br(value: &NaiveDateTime) -> askama::Result<String> {
    Ok(value.format("%d/%m/%Y").to_string())
}

/// Form/query encoding for a slot, parseable back by `NaiveDateTime::from_str`.
pub fn iso(value: &NaiveDateTime) -> askama::Result<String> {
    Ok(value.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn brl_uses_comma_decimals() {
        assert_eq!(brl(&50.0).unwrap(), "R$ 50,00");
        assert_eq!(brl(&19.9).unwrap(), "R$ 19,90");
    }

    #[test]
    fn iso_round_trips_through_parse() {
        let stamp = NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let encoded = iso(&stamp).unwrap();
        assert_eq!(encoded.parse::<NaiveDateTime>().unwrap(), stamp);
    }
}
