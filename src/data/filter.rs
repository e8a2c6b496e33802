//! Filter Engine Module
//! Applies categorical and range predicates to the candy table.

use super::schema::{Attribute, PERCENT_MAX, PRICE_COL, SUGAR_COL, WIN_COL};
use polars::prelude::*;

/// Selection for one boolean attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice {
    #[default]
    All,
    Yes,
    No,
}

impl Choice {
    pub const OPTIONS: [Choice; 3] = [Choice::All, Choice::Yes, Choice::No];

    /// The flag value a row must have, or `None` when unconstrained.
    pub fn required_value(self) -> Option<bool> {
        match self {
            Choice::All => None,
            Choice::Yes => Some(true),
            Choice::No => Some(false),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Choice::All => "All",
            Choice::Yes => "Yes",
            Choice::No => "No",
        }
    }
}

/// Current filter selections. Bounds are upper limits on the 0-100 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub choices: [Choice; 9],
    pub max_sugar: f64,
    pub max_price: f64,
    pub max_win: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            choices: [Choice::All; 9],
            max_sugar: PERCENT_MAX,
            max_price: PERCENT_MAX,
            max_win: PERCENT_MAX,
        }
    }
}

impl FilterSettings {
    pub fn choice(&self, attribute: Attribute) -> Choice {
        self.choices[attribute as usize]
    }

    pub fn choice_mut(&mut self, attribute: Attribute) -> &mut Choice {
        &mut self.choices[attribute as usize]
    }

    pub fn with_choice(mut self, attribute: Attribute, choice: Choice) -> Self {
        *self.choice_mut(attribute) = choice;
        self
    }

    /// Restore every selector and slider to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when no filter narrows the table.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Combined predicate for all active filters.
    pub fn predicate(&self) -> Expr {
        let mut predicate = lit(true);

        for attribute in Attribute::ALL {
            if let Some(wanted) = self.choice(attribute).required_value() {
                predicate = predicate.and(col(attribute.column()).eq(lit(wanted)));
            }
        }

        predicate
            .and(col(SUGAR_COL).lt_eq(lit(self.max_sugar)))
            .and(col(PRICE_COL).lt_eq(lit(self.max_price)))
            .and(col(WIN_COL).lt_eq(lit(self.max_win)))
    }
}

/// Return the rows of `df` passing every filter in `settings`.
///
/// An empty result is returned as-is; callers decide how to present it.
pub fn filter_candies(df: &DataFrame, settings: &FilterSettings) -> PolarsResult<DataFrame> {
    let filtered = df
        .clone()
        .lazy()
        .filter(settings.predicate())
        .collect()?;

    log::debug!(
        "Filter kept {} of {} candies",
        filtered.height(),
        df.height()
    );
    Ok(filtered)
}
