//! Pet form validation.
//!
//! Every field is checked and at most one message is kept per field (the
//! first rule it fails), so the form can show all problems at once.
//! Submission is blocked until [`validate_pet_form`] returns `Ok`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::item::ItemDraft;
use crate::price::Price;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const AGE_MAX: f64 = 30.0;

/// Raw text as entered in the upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub name: String,
    pub breed: String,
    pub age: String,
    pub price: String,
    pub image: Option<String>,
}

/// Field name -> message for every field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn check(&mut self, field: &str, result: Result<(), &'static str>) {
        if let Err(msg) = result {
            self.0.insert(field.to_string(), msg.to_string());
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, msg)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {msg}")?;
        }
        Ok(())
    }
}

/// Lengths are counted on the trimmed text, the same text the draft keeps,
/// so padding cannot carry a too-short name past the check.
fn check_text(
    value: &str,
    required: &'static str,
    too_short: &'static str,
    too_long: &'static str,
) -> Result<(), &'static str> {
    let len = value.trim().chars().count();
    if len == 0 {
        Err(required)
    } else if len < NAME_MIN {
        Err(too_short)
    } else if len > NAME_MAX {
        Err(too_long)
    } else {
        Ok(())
    }
}

fn check_age(value: &str) -> Result<u32, &'static str> {
    let text = value.trim();
    if text.is_empty() {
        return Err("Age is required");
    }
    let age: f64 = text.parse().map_err(|_| "Age must be a valid number")?;
    if !age.is_finite() {
        return Err("Age must be a valid number");
    }
    if age <= 0.0 {
        return Err("Age must be a positive number");
    }
    if age.fract() != 0.0 {
        return Err("Age must be an integer");
    }
    if age > AGE_MAX {
        return Err("Age must be less than 30 years");
    }
    Ok(age as u32)
}

fn check_price(value: &str) -> Result<Price, &'static str> {
    let text = value.trim();
    if text.is_empty() {
        return Err("Price is required");
    }
    let amount = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| "Price must be a valid number")?;
    if amount <= Decimal::ZERO {
        return Err("Price must be a positive number");
    }
    Price::new(amount).map_err(|_| "Price must be a positive number")
}

fn check_image(value: Option<&str>) -> Result<&str, &'static str> {
    match value.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err("Pet image is required"),
    }
}

/// Validate the upload form, producing the draft to add on success.
pub fn validate_pet_form(form: &PetForm) -> Result<ItemDraft, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    errors.check(
        "name",
        check_text(
            &form.name,
            "Pet name is required",
            "Pet name must be at least 2 characters",
            "Pet name must be less than 50 characters",
        ),
    );
    errors.check(
        "breed",
        check_text(
            &form.breed,
            "Breed is required",
            "Breed must be at least 2 characters",
            "Breed must be less than 50 characters",
        ),
    );
    let age = check_age(&form.age);
    errors.check("age", age.map(|_| ()));
    let price = check_price(&form.price);
    errors.check("price", price.map(|_| ()));
    let image = check_image(form.image.as_deref());
    errors.check("image", image.map(|_| ()));

    match (age, price, image) {
        (Ok(age), Ok(price), Ok(image)) if errors.is_empty() => {
            Ok(ItemDraft::new(form.name.trim(), form.breed.trim(), price)
                .with_age(age)
                .with_image(image))
        }
        _ => Err(errors),
    }
}
