use chrono::Datelike;

/// Map a timestamp to its `(year, quarter)` archive labels, e.g. `("2013", "q3")`.
pub fn quarter_of<T: Datelike>(t: &T) -> (String, String) {
    let quarter = 1 + (t.month() - 1) / 3;
    (t.year().to_string(), format!("q{quarter}"))
}
