//! `smartspend recommend` — One-shot recommendation for a profile.

use std::collections::HashMap;

use smartspend_config::AppConfig;
use smartspend_core::SpendingProfile;
use smartspend_gateway::build_engine;

pub async fn run(
    age: f64,
    income: f64,
    categories: Vec<String>,
    weights: Vec<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let weights = parse_weights(&weights)?;
    let predictor = smartspend_predictors::build_from_config(&config);
    let engine = build_engine(&config, predictor);

    let profile = SpendingProfile::new(age, income);
    let recommendation = engine
        .recommend(&profile, &categories, weights.as_ref())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    // Highest allocation first, name as tie-break for stable output.
    let mut rows: Vec<(&String, &f64)> = recommendation.iter().collect();
    rows.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(b.0)));

    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(8);
    for (name, amount) in rows {
        println!("  {name:<width$}  {amount:>12.2}");
    }

    Ok(())
}

/// Parse repeated `NAME=WEIGHT` arguments into a weight map.
fn parse_weights(args: &[String]) -> Result<Option<HashMap<String, f64>>, String> {
    if args.is_empty() {
        return Ok(None);
    }

    let mut weights = HashMap::new();
    for arg in args {
        let (name, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("invalid weight \"{arg}\" (expected NAME=WEIGHT)"))?;
        let value: f64 = value
            .parse()
            .map_err(|_| format!("invalid weight value in \"{arg}\""))?;
        weights.insert(name.to_string(), value);
    }
    Ok(Some(weights))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_weights_accepts_name_value_pairs() {
        let parsed = parse_weights(&["Gym=2".into(), "Dining=0.5".into()])
            .unwrap()
            .unwrap();
        assert_eq!(parsed["Gym"], 2.0);
        assert_eq!(parsed["Dining"], 0.5);
    }

    #[test]
    fn parse_weights_empty_is_none() {
        assert!(parse_weights(&[]).unwrap().is_none());
    }

    #[test]
    fn parse_weights_rejects_missing_equals() {
        assert!(parse_weights(&["Gym".into()]).is_err());
    }

    #[test]
    fn parse_weights_rejects_non_numeric() {
        assert!(parse_weights(&["Gym=lots".into()]).is_err());
    }
}
