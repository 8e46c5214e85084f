use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Separator between area and category in a synthesized description.
pub const DESCRIPTION_SEPARATOR: &str = " • ";

/// One meal record as TheMealDB returns it: a flat object with up to 20
/// paired ingredient/measure slots, many of which are blank or null.
/// We never mutate these, only read and normalize them.
#[derive(Debug, Clone, Deserialize)]
pub struct MealRecord {
    #[serde(rename = "idMeal")]
    pub id: Option<String>,
    #[serde(rename = "strMeal")]
    pub title: Option<String>,
    #[serde(rename = "strArea")]
    pub area: Option<String>,
    #[serde(rename = "strCategory")]
    pub category: Option<String>,
    #[serde(rename = "strInstructions")]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb")]
    pub thumb: Option<String>,
    /// strIngredient1..20 / strMeasure1..20 and anything else upstream adds.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl MealRecord {
    /// The first meal in a `{"meals": [...]}` payload, if any. A `meals`
    /// of null (upstream's "no results") yields `None`.
    pub fn first_from(payload: &Value) -> Option<MealRecord> {
        let meal = payload.get("meals")?.as_array()?.first()?;
        serde_json::from_value(meal.clone()).ok()
    }

    /// All well-formed meals in a `{"meals": [...]}` payload. Records that
    /// fail to deserialize are dropped, not surfaced as errors.
    pub fn all_from(payload: &Value) -> Vec<MealRecord> {
        payload
            .get("meals")
            .and_then(Value::as_array)
            .map(|meals| {
                meals
                    .iter()
                    .filter_map(|m| serde_json::from_value(m.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn slot(&self, prefix: &str, index: usize) -> &str {
        self.extra
            .get(&format!("{prefix}{index}"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
    }

    /// Flattens the 20 ingredient/measure slots into one newline-joined
    /// list. Blank ingredients are skipped entirely; a blank measure
    /// leaves just the ingredient on its line.
    pub fn ingredient_lines(&self) -> String {
        let mut lines = Vec::new();
        for i in 1..=20 {
            let ingredient = self.slot("strIngredient", i);
            if ingredient.is_empty() {
                continue;
            }
            let measure = self.slot("strMeasure", i);
            if measure.is_empty() {
                lines.push(ingredient.to_string());
            } else {
                lines.push(format!("{measure} {ingredient}"));
            }
        }
        lines.join("\n")
    }

    /// "Area • Category", dropping whichever side is blank. Empty when
    /// both are.
    pub fn description(&self) -> String {
        [self.area.as_deref(), self.category.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(DESCRIPTION_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meal(value: Value) -> MealRecord {
        serde_json::from_value(value).expect("meal should deserialize")
    }

    #[test]
    fn first_from_handles_null_meals() {
        assert!(MealRecord::first_from(&json!({"meals": null})).is_none());
        assert!(MealRecord::first_from(&json!({"meals": []})).is_none());
        assert!(MealRecord::first_from(&json!({})).is_none());

        let found = MealRecord::first_from(&json!({
            "meals": [{"idMeal": "52977", "strMeal": "Corba"}]
        }))
        .expect("one meal");
        assert_eq!(found.id.as_deref(), Some("52977"));
    }

    #[test]
    fn single_filled_slot_yields_one_trimmed_line() {
        let m = meal(json!({
            "strIngredient3": "  Paprika  ",
            "strMeasure3": " 1 tsp ",
        }));
        assert_eq!(m.ingredient_lines(), "1 tsp Paprika");
    }

    #[test]
    fn lasagne_sheets_scenario() {
        let m = meal(json!({
            "idMeal": "52977",
            "strIngredient1": "Lasagne Sheets",
            "strMeasure1": "500g",
            "strIngredient2": "",
            "strMeasure2": "",
        }));
        assert_eq!(m.ingredient_lines(), "500g Lasagne Sheets");
    }

    #[test]
    fn blank_measure_emits_ingredient_alone() {
        let m = meal(json!({
            "strIngredient1": "Salt",
            "strMeasure1": "  ",
            "strIngredient2": "Flour",
            "strMeasure2": "200g",
        }));
        assert_eq!(m.ingredient_lines(), "Salt\n200g Flour");
    }

    #[test]
    fn null_slots_are_skipped() {
        let m = meal(json!({
            "strIngredient1": null,
            "strMeasure1": "500g",
            "strIngredient2": "Butter",
        }));
        assert_eq!(m.ingredient_lines(), "Butter");
    }

    #[test]
    fn description_joins_area_and_category() {
        let both = meal(json!({"strArea": "Italian", "strCategory": "Pasta"}));
        assert_eq!(both.description(), "Italian • Pasta");

        let area_only = meal(json!({"strArea": "Italian", "strCategory": ""}));
        assert_eq!(area_only.description(), "Italian");

        let neither = meal(json!({"strArea": null, "strCategory": "  "}));
        assert_eq!(neither.description(), "");
    }
}
