//! Candy Dataset Schema
//! Column names, boolean attributes and the typed row view.

use polars::prelude::*;
use serde::Serialize;

pub const NAME_COL: &str = "competitorname";
pub const SUGAR_COL: &str = "sugarpercent";
pub const PRICE_COL: &str = "pricepercent";
pub const WIN_COL: &str = "winpercent";

/// Percentages are held on this scale everywhere inside the crate.
pub const PERCENT_MAX: f64 = 100.0;

/// Boolean attribute flags of a candy, in file column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Attribute {
    Chocolate,
    Fruity,
    Caramel,
    PeanutyAlmondy,
    Nougat,
    CrispedRiceWafer,
    Hard,
    Bar,
    Pluribus,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Chocolate,
        Attribute::Fruity,
        Attribute::Caramel,
        Attribute::PeanutyAlmondy,
        Attribute::Nougat,
        Attribute::CrispedRiceWafer,
        Attribute::Hard,
        Attribute::Bar,
        Attribute::Pluribus,
    ];

    /// CSV column name.
    pub fn column(self) -> &'static str {
        match self {
            Attribute::Chocolate => "chocolate",
            Attribute::Fruity => "fruity",
            Attribute::Caramel => "caramel",
            Attribute::PeanutyAlmondy => "peanutyalmondy",
            Attribute::Nougat => "nougat",
            Attribute::CrispedRiceWafer => "crispedricewafer",
            Attribute::Hard => "hard",
            Attribute::Bar => "bar",
            Attribute::Pluribus => "pluribus",
        }
    }

    /// Column header used in display tables.
    pub fn label(self) -> &'static str {
        match self {
            Attribute::Chocolate => "Chocolate",
            Attribute::Fruity => "Fruity",
            Attribute::Caramel => "Caramel",
            Attribute::PeanutyAlmondy => "Peanut/Almond",
            Attribute::Nougat => "Nougat",
            Attribute::CrispedRiceWafer => "Crisped Rice Wafer",
            Attribute::Hard => "Hard",
            Attribute::Bar => "Bar",
            Attribute::Pluribus => "Pluribus",
        }
    }

    /// Question shown next to the filter selector.
    pub fn question(self) -> &'static str {
        match self {
            Attribute::Chocolate => "Contains Chocolate?",
            Attribute::Fruity => "Is Fruity?",
            Attribute::Caramel => "Contains Caramel?",
            Attribute::PeanutyAlmondy => "Contains Peanuts?",
            Attribute::Nougat => "Contains Nougat?",
            Attribute::CrispedRiceWafer => "Contains Crisped Rice Wafer?",
            Attribute::Hard => "Is Hard Candy?",
            Attribute::Bar => "Is Bar?",
            Attribute::Pluribus => "Is Pluribus?",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Every column the loader requires, in file order.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![NAME_COL];
    cols.extend(Attribute::ALL.iter().map(|a| a.column()));
    cols.extend([SUGAR_COL, PRICE_COL, WIN_COL]);
    cols
}

/// One candy row, extracted from a normalized frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandyRecord {
    pub name: String,
    pub flags: [bool; 9],
    pub sugar_percent: f64,
    pub price_percent: f64,
    pub win_percent: f64,
}

impl CandyRecord {
    pub fn has(&self, attribute: Attribute) -> bool {
        self.flags[attribute.index()]
    }

    /// Extract typed rows from a frame produced by the loader (or any view of it).
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Vec<CandyRecord>> {
        let names = df.column(NAME_COL)?.str()?;
        let sugar = df.column(SUGAR_COL)?.f64()?;
        let price = df.column(PRICE_COL)?.f64()?;
        let win = df.column(WIN_COL)?.f64()?;
        let flag_cols = Attribute::ALL
            .iter()
            .map(|a| df.column(a.column()).and_then(|c| c.bool()))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let mut flags = [false; 9];
            for (slot, ca) in flags.iter_mut().zip(&flag_cols) {
                *slot = ca.get(i).unwrap_or(false);
            }
            records.push(CandyRecord {
                name: names.get(i).unwrap_or_default().to_string(),
                flags,
                sugar_percent: sugar.get(i).unwrap_or(f64::NAN),
                price_percent: price.get(i).unwrap_or(f64::NAN),
                win_percent: win.get(i).unwrap_or(f64::NAN),
            });
        }
        Ok(records)
    }
}

/// Candy names of a frame in row order.
pub fn candy_names(df: &DataFrame) -> PolarsResult<Vec<String>> {
    Ok(df
        .column(NAME_COL)?
        .str()?
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect())
}
