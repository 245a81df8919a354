use crate::model::TeamNumber;

// "frc254", "FRC254" and "254" all mean team 254
pub fn parse_team_key(key: &str) -> Option<TeamNumber> {
    let key = key.trim();
    let digits = match key.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("frc") => &key[3..],
        _ => key,
    };
    digits.parse().ok()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
