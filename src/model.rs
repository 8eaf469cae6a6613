use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Record {
    pub id: i64,
}

/// Row shape returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct ElectricityModel {
    pub id: i64,
    pub date: String,
    pub electricity: f64,
    pub diff: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, sqlx::FromRow)]
pub struct DailyElectricityRecord {
    pub id: i64,
    pub date: String,
    pub electricity: f64,
    pub diff: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A numeric form field. Forms send strings, JSON clients may send numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct PostElectricity {
    pub date: String,
    pub electricity: NumericField,
    pub diff: Option<NumericField>,
    pub id: Option<IdField>,
}

/// Record id as sent by an edit form. An empty value means no id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Number(i64),
    Text(String),
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricityInput {
    pub date: String,
    pub electricity: f64,
    pub diff: f64,
    pub id: Option<i64>,
}

impl TryFrom<PostElectricity> for ElectricityInput {
    type Error = AppError;

    fn try_from(request: PostElectricity) -> Result<Self, Self::Error> {
        let date = parse_date(&request.date)?;

        let electricity = parse_amount("electricity", &request.electricity)?
            .ok_or_else(|| AppError::Validation("electricity is required".into()))?;
        if electricity < 0.0 {
            return Err(AppError::Validation(
                "electricity must not be negative".into(),
            ));
        }

        let diff = match &request.diff {
            Some(field) => parse_amount("diff", field)?.unwrap_or(0.0),
            None => 0.0,
        };

        let id = match request.id {
            Some(IdField::Number(id)) => Some(id),
            Some(IdField::Text(text)) if text.trim().is_empty() => None,
            Some(IdField::Text(text)) => Some(text.trim().parse().map_err(|_| {
                AppError::Validation(format!("invalid id '{}'", text.trim()))
            })?),
            None => None,
        };

        Ok(ElectricityInput {
            date,
            electricity,
            diff,
            id,
        })
    }
}

/// Parses a calendar date and returns it in canonical `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|_| {
            AppError::Validation(format!(
                "invalid date '{}', expected YYYY-MM-DD",
                raw.trim()
            ))
        })
}

/// Returns `None` for an empty field.
fn parse_amount(field: &str, value: &NumericField) -> Result<Option<f64>, AppError> {
    let text = match value {
        NumericField::Number(n) => n.to_string(),
        NumericField::Text(s) => s.trim().to_string(),
    };
    if text.is_empty() {
        return Ok(None);
    }

    let invalid = || AppError::Validation(format!("invalid {field} '{text}'"));

    // Plain decimals only: optional sign, digits, optional fraction.
    let unsigned = text.strip_prefix(&['+', '-'][..]).unwrap_or(&text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }
    if fraction.len() > 2 {
        return Err(AppError::Validation(format!(
            "{field} allows at most two decimal places"
        )));
    }
    let amount = text.parse::<f64>().map_err(|_| invalid())?;
    if !amount.is_finite() {
        return Err(invalid());
    }

    Ok(Some(amount))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}
