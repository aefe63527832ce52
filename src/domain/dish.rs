use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A dish as stored by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub quick_prep: bool,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub calories: Option<u32>,
    pub user_id: i64,
}

/// Input for creating a dish, through the API or through the creation form.
///
/// `None` fields are left out of the request body and left untouched in the form,
/// so the application's defaults are what gets exercised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishFixture {
    pub name: String,
    pub description: String,
    pub quick_prep: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
}

impl DishFixture {
    /// A regular (not quick prep) dish with the default times, calories and steps.
    pub fn named(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            quick_prep: false,
            prep_time: Some(10),
            cook_time: Some(15),
            image_url: None,
            steps: vec![
                "Step 1: Prepare ingredients".into(),
                "Step 2: Cook the dish".into(),
                "Step 3: Serve".into(),
            ],
            calories: Some(250),
        }
    }

    pub fn with_times(mut self, prep_time: u32, cook_time: u32) -> Self {
        self.prep_time = Some(prep_time);
        self.cook_time = Some(cook_time);
        self
    }

    /// Quick prep dishes do not carry prep or cook times.
    pub fn quick(mut self) -> Self {
        self.quick_prep = true;
        self.prep_time = None;
        self.cook_time = None;
        self
    }
}

/// Body of `PUT /api/dishes/:id`. Only the `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_prep: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
}

/// `GET /api/dishes` answers either with a bare array or with `{ "dishes": [...] }`.
///
/// Both shapes end up as the same list. Any other body is an empty list.
pub fn normalize_dish_list(body: &Value) -> Result<Vec<Dish>, serde_json::Error> {
    match body {
        Value::Array(_) => Vec::<Dish>::deserialize(body),
        Value::Object(map) => match map.get("dishes") {
            Some(dishes) => Vec::<Dish>::deserialize(dishes),
            None => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}
